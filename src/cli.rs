//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use tdump_core::ThreadState;

/// Thread dump analyzer - parse and analyze JVM thread dumps
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tdump")]
#[command(
    about = "Parse and analyze JVM thread dumps (HotSpot, hs_err, OpenJ9, Android ART, JSON)",
    long_about = None
)]
pub struct Args {
    /// Thread dump files, optionally gzip-compressed
    #[arg(value_name = "FILE", required_unless_present = "clear_cache")]
    pub files: Vec<PathBuf>,

    /// Only report deadlocks
    #[arg(long)]
    pub deadlocks_only: bool,

    /// Only list threads in this state (e.g. RUNNABLE, timed-waiting)
    #[arg(long, value_name = "STATE")]
    pub filter_state: Option<ThreadState>,

    /// Number of stack hotspots to list
    #[arg(long, value_name = "N")]
    pub hotspots: Option<usize>,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Report new and disappeared threads between consecutive dumps
    #[arg(long)]
    pub diff: bool,

    /// Report state counts for every dump
    #[arg(long)]
    pub timeline: bool,

    /// Report threads runnable in every dump
    #[arg(long)]
    pub highcpu: bool,

    /// Report thread pools with no runnable member
    #[arg(long)]
    pub starvation: bool,

    /// Label for the dump at the same position (repeatable)
    #[arg(long = "label", value_name = "LABEL")]
    pub labels: Vec<String>,

    /// Drop all cached parse results before loading
    #[arg(long)]
    pub clear_cache: bool,

    /// Settings file (defaults to ./tdump.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Whether any mode that compares several dumps was requested
    pub fn is_multi_dump(&self) -> bool {
        self.diff || self.timeline || self.highcpu || self.starvation
    }
}
