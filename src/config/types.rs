//! Configuration types for the thread dump analyzer
//!
//! Defines:
//! - `Settings` - Root of `tdump.toml`
//! - `AnalysisSettings`, `CacheSettings`, `OutputSettings` - its sections

use serde::{Deserialize, Serialize};
use tdump_analysis::{DEFAULT_CACHE_CAPACITY, DEFAULT_HOTSPOT_LIMIT, DEFAULT_MIN_WAITERS};

/// Analyzer settings (`tdump.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub analysis: AnalysisSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

/// Analysis tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisSettings {
    /// Stack frames listed in the hotspot section
    #[serde(default = "default_hotspot_limit")]
    pub hotspot_limit: usize,

    /// Waiters a lock needs before it is reported as contended
    #[serde(default = "default_min_waiters")]
    pub min_waiters: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            hotspot_limit: DEFAULT_HOTSPOT_LIMIT,
            min_waiters: DEFAULT_MIN_WAITERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Parsed dumps kept in memory
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_hotspot_limit() -> usize {
    DEFAULT_HOTSPOT_LIMIT
}

fn default_min_waiters() -> usize {
    DEFAULT_MIN_WAITERS
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}
