//! Thread Dump Analyzer Library
//!
//! Command-line front end over the `tdump-*` crates: argument parsing, settings, and report
//! rendering. The binary in `main.rs` only installs error reporting and logging.

pub mod cli;
pub mod config;
pub mod report;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tdump_analysis::DumpCache;
use tdump_core::prelude::*;
use tdump_core::ThreadDump;

pub use cli::Args;
use config::{OutputFormat, Settings};
use report::ReportOptions;

/// A dump loaded from one input, with the name it is reported under.
#[derive(Debug, Clone)]
pub struct LoadedDump {
    pub source: String,
    pub dump: Arc<ThreadDump>,
}

impl LoadedDump {
    pub fn new(source: impl Into<String>, dump: Arc<ThreadDump>) -> Self {
        Self {
            source: source.into(),
            dump,
        }
    }

    /// The dump's label, else its source
    pub fn title(&self) -> &str {
        self.dump.label.as_deref().unwrap_or(&self.source)
    }
}

impl AsRef<ThreadDump> for LoadedDump {
    fn as_ref(&self) -> &ThreadDump {
        &self.dump
    }
}

/// Run with settings resolved from the working directory.
///
/// Returns `false` when no input could be loaded.
pub fn run(args: &Args, out: &mut impl Write, err: &mut impl Write) -> Result<bool> {
    let base_dir = std::env::current_dir()?;
    let settings = config::load_settings(&base_dir, args.config.as_deref())?;
    let cache = DumpCache::new(settings.cache.capacity);
    run_with(args, &settings, &cache, out, err)
}

pub fn run_with(
    args: &Args,
    settings: &Settings,
    cache: &DumpCache,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<bool> {
    if args.clear_cache {
        cache.clear();
        writeln!(err, "Cache cleared")?;
        if args.files.is_empty() {
            return Ok(true);
        }
    }

    let dumps = load_all(args, cache, err)?;
    if dumps.is_empty() {
        warn!("None of {} inputs could be loaded", args.files.len());
        return Ok(false);
    }

    let opts = ReportOptions {
        deadlocks_only: args.deadlocks_only,
        filter_state: args.filter_state,
        hotspot_limit: args.hotspots.unwrap_or(settings.analysis.hotspot_limit),
        min_waiters: settings.analysis.min_waiters,
    };

    if args.json || settings.output.format == OutputFormat::Json {
        let value = json_report(args, &dumps, &opts);
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        text_report(args, &dumps, &opts, out)?;
    }
    Ok(true)
}

/// Load every input through the cache. Failures are reported and skipped.
fn load_all(args: &Args, cache: &DumpCache, err: &mut impl Write) -> Result<Vec<LoadedDump>> {
    let mut dumps = Vec::with_capacity(args.files.len());
    for (index, path) in args.files.iter().enumerate() {
        match cache.load_file(path) {
            Ok(dump) => {
                let dump = match args.labels.get(index) {
                    Some(label) => Arc::new(dump.with_label(label.as_str())),
                    None => dump,
                };
                info!("Loaded {} ({} threads)", path.display(), dump.threads.len());
                dumps.push(LoadedDump::new(source_name(path), dump));
            }
            Err(e) if e.is_structural() => {
                writeln!(err, "Failed to parse {}: {}", path.display(), e)?;
            }
            Err(e) => {
                writeln!(err, "Failed to load {}: {}", path.display(), e)?;
            }
        }
    }
    Ok(dumps)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn text_report(
    args: &Args,
    dumps: &[LoadedDump],
    opts: &ReportOptions,
    out: &mut impl Write,
) -> Result<()> {
    if !args.is_multi_dump() {
        for (index, loaded) in dumps.iter().enumerate() {
            if index > 0 {
                writeln!(out)?;
            }
            report::write_dump(out, index, loaded, opts)?;
        }
        return Ok(());
    }

    if args.timeline {
        report::write_timeline(out, dumps)?;
    }
    if args.diff {
        report::write_diff(out, dumps)?;
    }
    if args.highcpu {
        report::write_high_cpu(out, dumps)?;
    }
    if args.starvation {
        report::write_starvation(out, dumps)?;
    }
    Ok(())
}

fn json_report(args: &Args, dumps: &[LoadedDump], opts: &ReportOptions) -> Value {
    let mut sections = Map::new();
    if !args.is_multi_dump() {
        sections.insert(
            "dumps".into(),
            dumps.iter().map(|d| report::dump_json(d, opts)).collect(),
        );
    }
    if args.timeline {
        sections.insert("timeline".into(), report::timeline_json(dumps));
    }
    if args.diff {
        sections.insert("diff".into(), report::diff_json(dumps));
    }
    if args.highcpu {
        sections.insert("highCpu".into(), report::high_cpu_json(dumps));
    }
    if args.starvation {
        sections.insert("starvation".into(), report::starvation_json(dumps));
    }
    Value::Object(sections)
}
