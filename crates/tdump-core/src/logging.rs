//! File logging for the analyzer.
//!
//! Reports go to stdout, so diagnostics are written to a daily rolling file instead.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_ENV_VAR: &str = "TDUMP_LOG";
const LOG_FILE_PREFIX: &str = "tdump.log";

/// Filter used when `TDUMP_LOG` is unset or invalid. Covers the binary and every library
/// crate at info; anything else only at warn.
pub const DEFAULT_FILTER: &str =
    "thread_dump_analyzer=info,tdump_core=info,tdump_parser=info,tdump_analysis=info,warn";

/// Install the global subscriber writing to `<data dir>/thread-dump-analyzer/logs/`.
///
/// ```bash
/// TDUMP_LOG=debug tdump dump.txt
/// TDUMP_LOG=tdump_parser=trace tdump dump.txt
/// ```
pub fn init() -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!(
        "tdump {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Directory holding the rolling log files (`tdump.log.YYYY-MM-DD`).
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thread-dump-analyzer")
        .join("logs")
}
