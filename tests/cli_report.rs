//! End-to-end tests of the command-line report over fixture files

use std::path::PathBuf;

use clap::Parser;
use tdump_analysis::DumpCache;
use thread_dump_analyzer::config::{OutputFormat, Settings};
use thread_dump_analyzer::{run_with, Args};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/dumps")
        .join(name)
        .display()
        .to_string()
}

struct Output {
    ok: bool,
    stdout: String,
    stderr: String,
}

fn run_cli(argv: &[&str]) -> Output {
    run_cli_with(argv, &Settings::default())
}

fn run_cli_with(argv: &[&str], settings: &Settings) -> Output {
    let args = Args::try_parse_from(std::iter::once("tdump").chain(argv.iter().copied())).unwrap();
    let cache = DumpCache::new(settings.cache.capacity);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let ok = run_with(&args, settings, &cache, &mut out, &mut err).unwrap();
    Output {
        ok,
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
    }
}

#[test]
fn test_filter_state_runnable() {
    let output = run_cli(&["--filter-state", "RUNNABLE", &fixture("hotspot.txt")]);
    assert!(output.ok);
    assert!(output.stdout.contains("Threads in state RUNNABLE"));
    assert!(output.stdout.contains("\"main\""));
    assert!(!output.stdout.contains("pool-1-thread-1"));
}

#[test]
fn test_deadlocks_only() {
    let output = run_cli(&["--deadlocks-only", &fixture("deadlock.txt")]);
    assert!(output.ok);
    assert!(output.stdout.contains("Deadlock 1"));
    assert!(output.stdout.contains("Thread-A"));
    assert!(output.stdout.contains("Thread-B"));
}

#[test]
fn test_diff_two_dumps() {
    let output = run_cli(&[
        "--diff",
        &fixture("diff_before.txt"),
        &fixture("diff_after.txt"),
    ]);
    assert!(output.ok);
    assert!(output.stdout.contains("New threads: 1"));
    assert!(output.stdout.contains("worker-3"));
    assert!(output.stdout.contains("Disappeared threads: 1"));
    assert!(output.stdout.contains("worker-1"));
}

#[test]
fn test_timeline_counts() {
    let output = run_cli(&[
        "--timeline",
        &fixture("hotspot.txt"),
        &fixture("deadlock.txt"),
    ]);
    assert!(output.stdout.contains("Dump 1"));
    assert!(output.stdout.contains("RUNNABLE"));
    assert!(output.stdout.contains("Dump 2"));
    assert!(output.stdout.contains("BLOCKED"));
}

#[test]
fn test_high_cpu_detection() {
    let output = run_cli(&[
        "--highcpu",
        &fixture("diff_before.txt"),
        &fixture("diff_after.txt"),
    ]);
    assert!(output.stdout.contains("High CPU thread candidates"));
    assert!(output.stdout.contains("main"));
    assert!(output.stdout.contains("worker-2"));
    assert!(!output.stdout.contains("worker-1"));
}

#[test]
fn test_starvation_detection() {
    let output = run_cli(&["--starvation", &fixture("group.txt")]);
    assert!(output.stdout.contains("Potential thread pool starvation"));
    assert!(output.stdout.contains("pool-1-thread"));
}

#[test]
fn test_custom_label_displayed() {
    let output = run_cli(&["--label", "MyDump", &fixture("hotspot.txt")]);
    assert!(output.stdout.contains("MyDump"));
}

#[test]
fn test_clear_cache_flag() {
    let output = run_cli(&["--clear-cache", &fixture("hotspot.txt")]);
    assert!(output.ok);
    assert!(!output.stdout.contains("Error"));
    assert!(output.stderr.contains("Cache cleared"));
}

#[test]
fn test_bad_file_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt").display().to_string();
    let output = run_cli(&[&missing, &fixture("hotspot.txt")]);
    assert!(output.ok);
    assert!(output.stderr.contains("Failed to load"));
    assert!(output.stdout.contains("hotspot.txt"));
}

#[test]
fn test_malformed_file_is_reported_as_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{\"threads\": [").unwrap();
    let broken = broken.display().to_string();
    let output = run_cli(&[&broken, &fixture("hotspot.txt")]);
    assert!(output.ok);
    assert!(output.stderr.contains("Failed to parse"));
    assert!(!output.stderr.contains("Failed to load"));
    assert!(output.stdout.contains("hotspot.txt"));
}

#[test]
fn test_nothing_loaded_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{\"threads\": [").unwrap();
    let output = run_cli(&[&broken.display().to_string()]);
    assert!(!output.ok);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_json_output() {
    let output = run_cli(&["--json", "--hotspots", "1", &fixture("group.txt")]);
    let value: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let dump = &value["dumps"][0];
    assert_eq!(dump["threadCount"], 3);
    assert_eq!(dump["stateCounts"]["WAITING"], 3);
    assert_eq!(dump["stackHotspots"].as_array().unwrap().len(), 1);
    assert_eq!(dump["contendedLocks"][0]["waiters"].as_array().unwrap().len(), 3);
}

#[test]
fn test_json_format_from_settings() {
    let mut settings = Settings::default();
    settings.output.format = OutputFormat::Json;
    let output = run_cli_with(
        &["--highcpu", &fixture("diff_before.txt"), &fixture("diff_after.txt")],
        &settings,
    );
    let value: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(value["highCpu"].as_array().unwrap().len(), 2);
}

#[test]
fn test_gzip_input_file() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.txt.gz");
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&std::fs::read(fixture("hotspot.txt")).unwrap())
        .unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let output = run_cli(&["--filter-state", "WAITING", &path.display().to_string()]);
    assert!(output.stdout.contains("Threads in state WAITING (1)"));
}
