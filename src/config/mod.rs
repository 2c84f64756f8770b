//! Configuration file parsing for the thread dump analyzer
//!
//! Supports:
//! - `tdump.toml` in the working directory - implicit settings
//! - any path passed with `--config` - explicit settings

pub mod settings;
pub mod types;

pub use settings::{load_settings, CONFIG_FILENAME};
pub use types::*;
