//! Parser for Android ART `kill -3` / debuggerd traces.
//!
//! ```text
//! ----- pid 1234 at 2024-01-15 10:30:00 -----
//! "main" prio=5 tid=1 Native
//!   | group="main" sCount=1 dsCount=0 flags=1 obj=0x72f6a4c8 self=0xb400007
//!   | sysTid=1234 nice=-10 cgrp=top-app sched=0/0 handle=0x7b5e1c44f8
//!   at android.os.MessageQueue.nativePollOnce(Native method)
//! ```

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tdump_core::{ThreadDump, ThreadState};
use tracing::debug;

use crate::lines::{
    classify_java_line, header_is_daemon, header_priority, parse_decimal_id,
    parse_local_timestamp, BodyLine,
};
use crate::record::{ThreadRecord, ThreadScanner};

/// Captures: 1=thread name, 2=tid, 3=state word
pub static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"([^"]+)".*?tid=(\d+)\s+(\S+)"#).expect("Invalid Android HEADER_REGEX")
});

pub static PID_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^----- pid \d+ at (\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})")
        .expect("Invalid PID_LINE_REGEX")
});

pub fn parse(text: &str) -> ThreadDump {
    let mut scanner = ThreadScanner::new();
    let mut timestamp = None;

    for line in text.lines() {
        if let Some(caps) = HEADER_REGEX.captures(line) {
            let mut record = ThreadRecord::new(&caps[1], parse_decimal_id(&caps[2]));
            record.state = map_state(&caps[3]);
            record.priority = header_priority(line);
            record.daemon = Some(header_is_daemon(line));
            scanner.begin(record);
            continue;
        }

        let Some(record) = scanner.current() else {
            if timestamp.is_none() {
                if let Some(caps) = PID_LINE_REGEX.captures(line) {
                    timestamp = parse_local_timestamp(&caps[1]);
                }
            }
            continue;
        };

        // ART has no `java.lang.Thread.State:` lines; the header word is authoritative
        match classify_java_line(line) {
            Some(BodyLine::State(_)) | None => {}
            Some(body) => record.apply(body),
        }
    }

    let threads = scanner.finish();
    debug!("Android ART parser produced {} threads", threads.len());

    ThreadDump::new(timestamp.unwrap_or_else(Utc::now), threads)
}

/// ART prints states as words (`Runnable`, `Native`, `Sleeping`, `TimedWaiting`...).
fn map_state(word: &str) -> ThreadState {
    let upper = word.to_ascii_uppercase();
    if upper.contains("RUNNABLE") || upper == "R" {
        ThreadState::Runnable
    } else if upper.contains("BLOCK") {
        ThreadState::Blocked
    } else if upper.contains("WAIT") {
        ThreadState::Waiting
    } else if upper.contains("SLEEP") {
        ThreadState::TimedWaiting
    } else {
        ThreadState::Runnable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdump_core::LockInfo;

    const SAMPLE: &str = r#"
----- pid 1234 at 2024-01-15 10:30:00 -----
Cmd line: com.example.app
Build fingerprint: 'google/sdk_gphone64_x86_64/emu64xa:14/UE1A.230829.036/10747364:userdebug/dev-keys'

DALVIK THREADS (3):
"main" prio=5 tid=1 Runnable
  | group="main" sCount=0 ucsCount=0 flags=0 obj=0x72f6a4c8 self=0xb400007c1e8a6be0
  | sysTid=1234 nice=-10 cgrp=top-app sched=0/0 handle=0x7d5e1c44f8
  at com.example.app.MainActivity.onCreate(MainActivity.java:25)
  at android.app.Activity.performCreate(Activity.java:8305)

"Signal Catcher" daemon prio=10 tid=3 WaitingInMainSignalCatcherLoop
  | group="system" sCount=1 ucsCount=0 flags=1 obj=0x13080228 self=0xb400007c1e8b1000

"worker" prio=5 tid=12 Blocked
  | group="main" sCount=1 ucsCount=0 flags=1 obj=0x13080300 self=0xb400007c1e8b2000
  at com.example.app.Repo.load(Repo.java:40)
  - waiting to lock <0x0c1c5a5e> (a java.lang.Object) held by thread 1
  - locked <0x0d2d6b6f> (a com.example.app.Repo)

----- end 1234 -----
"#;

    #[test]
    fn test_parses_threads() {
        let dump = parse(SAMPLE);
        assert_eq!(dump.threads.len(), 3);
        assert_eq!(dump.threads[0].name, "main");
        assert_eq!(dump.threads[0].id, 1);
        assert_eq!(dump.threads[0].state, ThreadState::Runnable);
        assert_eq!(dump.threads[0].stack.len(), 2);
    }

    #[test]
    fn test_header_hints() {
        let dump = parse(SAMPLE);
        let catcher = &dump.threads[1];
        assert_eq!(catcher.daemon, Some(true));
        assert_eq!(catcher.priority, Some(10));
        assert_eq!(catcher.state, ThreadState::Waiting);
    }

    #[test]
    fn test_lock_lines() {
        let dump = parse(SAMPLE);
        let worker = &dump.threads[2];
        assert_eq!(worker.state, ThreadState::Blocked);
        assert_eq!(
            worker.waiting_on,
            Some(LockInfo::new("java.lang.Object", "0x0c1c5a5e"))
        );
        assert_eq!(
            worker.locked_monitors,
            vec![LockInfo::new("com.example.app.Repo", "0x0d2d6b6f")]
        );
    }

    #[test]
    fn test_timestamp_from_pid_line() {
        let dump = parse(SAMPLE);
        assert_eq!(dump.timestamp.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_state_words() {
        assert_eq!(map_state("Runnable"), ThreadState::Runnable);
        assert_eq!(map_state("R"), ThreadState::Runnable);
        assert_eq!(map_state("Native"), ThreadState::Runnable);
        assert_eq!(map_state("Blocked"), ThreadState::Blocked);
        assert_eq!(map_state("TimedWaiting"), ThreadState::Waiting);
        assert_eq!(map_state("Sleeping"), ThreadState::TimedWaiting);
        assert_eq!(map_state("Suspended"), ThreadState::Runnable);
    }
}
