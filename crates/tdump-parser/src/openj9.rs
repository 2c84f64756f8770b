//! Parser for OpenJ9 / IBM javacore thread sections.
//!
//! Javacore lines are tagged: `3XMTHREADINFO` opens a thread, `3XMTHREADINFO1` carries the
//! native id, `4XESTACKTRACE` is a frame and `5XESTACKTRACE (entered lock: ...)` records a
//! monitor held by the frame above it. Class names are printed with `/` separators and are
//! normalized to dotted form.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tdump_core::{LockInfo, StackFrame, ThreadDump, ThreadState};
use tracing::debug;

use crate::lines::{header_priority, parse_hex_id, parse_line_number};
use crate::record::{ThreadRecord, ThreadScanner};

/// Captures: 1=thread name, 2=state code
pub static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\dXM\w*INFO\s+"([^"]+)".*?\bstate:([A-Z]+)"#)
        .expect("Invalid OpenJ9 HEADER_REGEX")
});

pub static THREAD_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"native thread ID:0x([0-9a-fA-F]+)").expect("Invalid THREAD_ID_REGEX")
});

/// Captures: 1=class (slashed), 2=method, 3=file, 4=line (optional)
pub static STACK_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^4XESTACKTRACE\s+at\s+([\w.$/]+)\.([\w$<>]+)\(([^:)]*)(?::(\d+))?")
        .expect("Invalid OpenJ9 STACK_LINE_REGEX")
});

/// Captures: 1=class (slashed), 2=identity
pub static ENTERED_LOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^5XESTACKTRACE\s+\(entered lock: ([^@\s]+)@(0x[0-9a-fA-F]+)")
        .expect("Invalid ENTERED_LOCK_REGEX")
});

/// `Waiting on:` is an `Object.wait` and does not contend for the monitor.
/// Captures: 1=class (slashed), 2=identity
pub static BLOCKED_ON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^3XMTHREADBLOCK\s+(?:Blocked on|Parked on):\s*([^@\s]+)@(0x[0-9a-fA-F]+)")
        .expect("Invalid BLOCKED_ON_REGEX")
});

pub static DAEMON_FLAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"isDaemon:(true|false)").expect("Invalid DAEMON_FLAG_REGEX"));

pub static JAVA_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^1CIJAVAVERSION\s+(.+?)\s*$").expect("Invalid JAVA_VERSION_REGEX")
});

pub fn parse(text: &str) -> ThreadDump {
    let mut scanner = ThreadScanner::new();
    let mut jvm_version = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = HEADER_REGEX.captures(line) {
            let mut record = ThreadRecord::new(&caps[1], -1);
            record.state = map_state(&caps[2]);
            record.priority = header_priority(line);
            scanner.begin(record);
            continue;
        }

        let Some(record) = scanner.current() else {
            if let Some(caps) = JAVA_VERSION_REGEX.captures(line) {
                jvm_version = Some(caps[1].to_string());
            }
            continue;
        };

        if let Some(caps) = THREAD_ID_REGEX.captures(line) {
            record.id = parse_hex_id(&caps[1]);
            continue;
        }

        if let Some(caps) = DAEMON_FLAG_REGEX.captures(line) {
            record.daemon = Some(&caps[1] == "true");
            continue;
        }

        if let Some(caps) = STACK_LINE_REGEX.captures(line) {
            record.stack.push(StackFrame::new(
                dotted(&caps[1]),
                &caps[2],
                &caps[3],
                parse_line_number(caps.get(4).map(|m| m.as_str())),
            ));
            continue;
        }

        if let Some(caps) = BLOCKED_ON_REGEX.captures(line) {
            record.waiting_on = Some(LockInfo::new(dotted(&caps[1]), &caps[2]));
            continue;
        }

        if let Some(caps) = ENTERED_LOCK_REGEX.captures(line) {
            record
                .locked_monitors
                .push(LockInfo::new(dotted(&caps[1]), &caps[2]));
        }
    }

    let threads = scanner.finish();
    debug!("OpenJ9 parser produced {} threads", threads.len());

    let mut dump = ThreadDump::new(Utc::now(), threads);
    dump.jvm_version = jvm_version;
    dump
}

/// Javacore state codes.
fn map_state(code: &str) -> ThreadState {
    match code {
        "R" => ThreadState::Runnable,
        "CW" | "MW" | "P" | "S" => ThreadState::Waiting,
        "B" => ThreadState::Blocked,
        _ => ThreadState::Runnable,
    }
}

fn dotted(class: &str) -> String {
    class.replace('/', ".")
}
