//! Parser for HotSpot-style full thread dumps (`jstack`, `kill -3`, `jcmd Thread.print`).
//!
//! ```text
//! 2024-01-15 10:30:00
//! Full thread dump Java HotSpot(TM) 64-Bit Server VM (17.0.1+12-LTS-39 mixed mode):
//!
//! "main" #1 prio=5 os_prio=0 tid=0x00007f1c2c00a800 nid=0x1c03 waiting on condition
//!    java.lang.Thread.State: WAITING (parking)
//!         at jdk.internal.misc.Unsafe.park(java.base@17.0.1/Native Method)
//!         - parking to wait for  <0x000000071a8c2d10> (a java.util.concurrent.CountDownLatch$Sync)
//! ```

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tdump_core::ThreadDump;
use tracing::debug;

use crate::lines::{
    classify_java_line, header_is_daemon, header_priority, parse_hex_id, parse_local_timestamp,
};
use crate::record::{ThreadRecord, ThreadScanner};

/// Captures: 1=thread name, 2=nid hex digits
pub static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"([^"]+)".*?nid=0x([0-9a-fA-F]+)"#).expect("Invalid HotSpot HEADER_REGEX")
});

/// Captures: 1=VM description
pub static VM_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Full (?:Java )?thread dump (.+?):?\s*$").expect("Invalid VM_LINE_REGEX")
});

/// Captures: 1=timestamp printed by jstack above the VM line
pub static TIMESTAMP_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\s*$")
        .expect("Invalid TIMESTAMP_LINE_REGEX")
});

pub fn parse(text: &str) -> ThreadDump {
    let mut scanner = ThreadScanner::new();
    let mut timestamp = None;
    let mut jvm_version = None;

    for line in text.lines() {
        if let Some(caps) = HEADER_REGEX.captures(line) {
            let mut record = ThreadRecord::new(&caps[1], parse_hex_id(&caps[2]));
            record.priority = header_priority(line);
            record.daemon = Some(header_is_daemon(line));
            scanner.begin(record);
            continue;
        }

        let Some(record) = scanner.current() else {
            if jvm_version.is_none() {
                if let Some(caps) = VM_LINE_REGEX.captures(line) {
                    jvm_version = Some(caps[1].to_string());
                    continue;
                }
            }
            if timestamp.is_none() {
                if let Some(caps) = TIMESTAMP_LINE_REGEX.captures(line) {
                    timestamp = parse_local_timestamp(&caps[1]);
                }
            }
            continue;
        };

        if let Some(body) = classify_java_line(line) {
            record.apply(body);
        }
    }

    let threads = scanner.finish();
    debug!("HotSpot parser produced {} threads", threads.len());

    let mut dump = ThreadDump::new(timestamp.unwrap_or_else(Utc::now), threads);
    dump.jvm_version = jvm_version;
    dump
}
