//! Line matchers shared by the Java-style text grammars.
//!
//! HotSpot, crash-log and Android dumps print frames and lock annotations the same way, so
//! their body lines go through [`classify_java_line`]. Numeric helpers here implement the
//! soft-default rule: a token that does not parse becomes -1, it never aborts the parse.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use tdump_core::{LockInfo, StackFrame, ThreadState};

// ─────────────────────────────────────────────────────────────────────────────
// Regex Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// Matches `   java.lang.Thread.State: WAITING (on object monitor)`
/// Captures: 1=state token
pub static STATE_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*java\.lang\.Thread\.State: (\S+)").expect("Invalid STATE_LINE_REGEX")
});

/// Matches `at example.Main.main(Main.java:12)` on a trimmed line, with an optional
/// `module@version/` or `loader//` prefix before the class. A hidden-class suffix
/// (`LambdaForm$DMH/0x0000000801001000`) stays part of the class name.
/// Captures: 1=class, 2=method, 3=file, 4=line (optional)
pub static JAVA_FRAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^at\s+(?:[\w.$-]+@[^/\s]*/|[\w.$-]*//)?([\w.$]+(?:/0x[0-9a-fA-F]+)?)\.([\w$<>]+)\(([^:)]*)(?::(\d+))?\)",
    )
        .expect("Invalid JAVA_FRAME_REGEX")
});

/// Captures: 1=identity, 2=class
pub static WAITING_TO_LOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s+waiting to lock <([^>]+)> \(([^)]+)\)").expect("Invalid WAITING_TO_LOCK_REGEX")
});

/// Captures: 1=identity, 2=class
pub static PARKING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s+parking to wait for\s+<([^>]+)> \(([^)]+)\)").expect("Invalid PARKING_REGEX")
});

/// Captures: 1=identity, 2=class
pub static LOCKED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s+locked <([^>]+)> \(([^)]+)\)").expect("Invalid LOCKED_REGEX")
});

/// `prio=5`, but not `os_prio=0`
pub static PRIORITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)prio=(\d+)").expect("Invalid PRIORITY_REGEX"));

// ─────────────────────────────────────────────────────────────────────────────
// Body Lines
// ─────────────────────────────────────────────────────────────────────────────

/// What a thread body line contributes to the record being accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyLine {
    State(ThreadState),
    Frame(StackFrame),
    WaitingToLock(LockInfo),
    ParkingFor(LockInfo),
    Locked(LockInfo),
}

/// Classify one line inside a thread block.
///
/// Tested in a fixed order: state line, call frame, waiting to lock, parking, locked.
/// Anything else yields `None` and is ignored by the caller.
pub fn classify_java_line(line: &str) -> Option<BodyLine> {
    if let Some(caps) = STATE_LINE_REGEX.captures(line) {
        return Some(BodyLine::State(ThreadState::from_canonical_or_runnable(
            &caps[1],
        )));
    }

    let trimmed = line.trim();

    if let Some(frame) = parse_java_frame(trimmed) {
        return Some(BodyLine::Frame(frame));
    }

    if let Some(caps) = WAITING_TO_LOCK_REGEX.captures(trimmed) {
        return Some(BodyLine::WaitingToLock(lock_from(&caps[2], &caps[1])));
    }

    if let Some(caps) = PARKING_REGEX.captures(trimmed) {
        return Some(BodyLine::ParkingFor(lock_from(&caps[2], &caps[1])));
    }

    if let Some(caps) = LOCKED_REGEX.captures(trimmed) {
        return Some(BodyLine::Locked(lock_from(&caps[2], &caps[1])));
    }

    None
}

/// Parse a trimmed `at Class.method(File:line)` line.
pub fn parse_java_frame(trimmed: &str) -> Option<StackFrame> {
    let caps = JAVA_FRAME_REGEX.captures(trimmed)?;
    Some(StackFrame::new(
        &caps[1],
        &caps[2],
        &caps[3],
        parse_line_number(caps.get(4).map(|m| m.as_str())),
    ))
}

/// Lock annotations print the class as `a java.lang.Object`; keep just the class.
///
/// Dropping the leading `a `/`an ` article is a deliberate normalisation: every parser
/// stores the bare class name, so locks from jstack text compare equal to the same
/// lock read from a JSON export.
pub fn lock_from(class_text: &str, identity: &str) -> LockInfo {
    let class_name = class_text
        .strip_prefix("a ")
        .or_else(|| class_text.strip_prefix("an "))
        .unwrap_or(class_text);
    LockInfo::new(class_name.trim(), identity)
}

// ─────────────────────────────────────────────────────────────────────────────
// Numeric Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Hex id without the `0x` prefix; -1 when it does not fit or is not hex.
pub fn parse_hex_id(token: &str) -> i64 {
    i64::from_str_radix(token, 16).unwrap_or(-1)
}

/// Decimal id; -1 when it does not parse.
pub fn parse_decimal_id(token: &str) -> i64 {
    token.parse().unwrap_or(-1)
}

/// Optional line number token; -1 when absent or unparsable.
pub fn parse_line_number(token: Option<&str>) -> i32 {
    token.and_then(|t| t.parse().ok()).unwrap_or(-1)
}

pub fn parse_optional<T: FromStr>(token: &str) -> Option<T> {
    token.parse().ok()
}

/// `prio=N` from a header line.
pub fn header_priority(line: &str) -> Option<i32> {
    PRIORITY_REGEX
        .captures(line)
        .and_then(|caps| parse_optional(&caps[1]))
}

pub fn header_is_daemon(line: &str) -> bool {
    line.contains(" daemon ")
}

/// `2024-01-15 10:30:00` as printed by jstack and the Android runtime. Dumps carry no zone,
/// the value is taken as UTC.
pub fn parse_local_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
