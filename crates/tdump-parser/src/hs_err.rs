//! Parser for `hs_err_pid<N>.log` crash logs.
//!
//! Only the thread listing is of interest. Two header shapes occur: the jstack-like
//! `"name" ... nid=0x...` form and the crash-log thread table form
//! `=>0x00007f... JavaThread "main" [_thread_in_native, id=1234, stack(...)]`.
//! The `_thread_*` status token in the latter seeds the thread state.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tdump_core::{ThreadDump, ThreadState};
use tracing::debug;

use crate::lines::{
    classify_java_line, header_is_daemon, header_priority, parse_decimal_id, parse_hex_id,
};
use crate::record::{ThreadRecord, ThreadScanner};

/// Captures: 1=thread name
pub static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:=>)?\s*(?:0x[0-9a-fA-F]+\s+\w+\s+)?"([^"]+)""#)
        .expect("Invalid hs_err HEADER_REGEX")
});

pub static NID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"nid=0x([0-9a-fA-F]+)").expect("Invalid NID_REGEX"));

/// `id=1234` inside the thread table brackets (not `tid=` / `nid=`)
pub static DECIMAL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bid=(\d+)").expect("Invalid DECIMAL_ID_REGEX"));

pub static STATUS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[_thread_(\w+)").expect("Invalid STATUS_REGEX"));

pub static JRE_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s+JRE version:\s*(.+?)\s*$").expect("Invalid JRE_VERSION_REGEX")
});

pub static ELAPSED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^elapsed time:\s*([0-9]+(?:\.[0-9]+)?) seconds").expect("Invalid ELAPSED_REGEX")
});

pub fn parse(text: &str) -> ThreadDump {
    let mut scanner = ThreadScanner::new();
    let mut jvm_version = None;
    let mut uptime_millis = None;

    for line in text.lines() {
        if let Some(caps) = HEADER_REGEX.captures(line) {
            scanner.begin(header_record(&caps[1], line));
            continue;
        }

        // Metadata lines appear both before and after the thread listing
        if jvm_version.is_none() {
            if let Some(caps) = JRE_VERSION_REGEX.captures(line) {
                jvm_version = Some(caps[1].to_string());
                continue;
            }
        }
        if let Some(caps) = ELAPSED_REGEX.captures(line) {
            uptime_millis = caps[1]
                .parse::<f64>()
                .ok()
                .map(|secs| (secs * 1000.0).round() as i64);
            continue;
        }

        let Some(record) = scanner.current() else {
            continue;
        };

        if let Some(body) = classify_java_line(line) {
            record.apply(body);
        }
    }

    let threads = scanner.finish();
    debug!("hs_err parser produced {} threads", threads.len());

    let mut dump = ThreadDump::new(Utc::now(), threads);
    dump.jvm_version = jvm_version;
    dump.uptime_millis = uptime_millis;
    dump
}

fn header_record(name: &str, line: &str) -> ThreadRecord {
    let id = if let Some(caps) = NID_REGEX.captures(line) {
        parse_hex_id(&caps[1])
    } else if let Some(caps) = DECIMAL_ID_REGEX.captures(line) {
        parse_decimal_id(&caps[1])
    } else {
        -1
    };

    let mut record = ThreadRecord::new(name, id);
    record.priority = header_priority(line);
    record.daemon = Some(header_is_daemon(line));
    if let Some(caps) = STATUS_REGEX.captures(line) {
        record.state = status_to_state(&caps[1]);
    }
    record
}

/// Map the crash log's `_thread_*` status suffix onto a canonical state.
fn status_to_state(status: &str) -> ThreadState {
    if status.starts_with("blocked") {
        ThreadState::Blocked
    } else if status == "new" || status == "new_trans" {
        ThreadState::New
    } else {
        ThreadState::Runnable
    }
}
