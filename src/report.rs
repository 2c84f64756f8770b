//! Text and JSON rendering of analysis results.

use std::io::{self, Write};

use serde_json::{json, Value};
use tdump_analysis::{
    compute_stack_hotspots, compute_state_counts, detect_deadlocks, detect_thread_pool_starvation,
    diff, filter_by_state, find_high_cpu_threads, find_lock_contention_hotspots,
    find_state_changes, group_similar_threads,
};
use tdump_core::{ThreadDump, ThreadInfo, ThreadState};

use crate::LoadedDump;

/// Per-dump report switches
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub deadlocks_only: bool,
    pub filter_state: Option<ThreadState>,
    pub hotspot_limit: usize,
    pub min_waiters: usize,
}

fn thread_line(thread: &ThreadInfo) -> String {
    format!("\"{}\" #{} {}", thread.name, thread.id, thread.state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────────────────────────

pub fn write_dump(
    out: &mut impl Write,
    index: usize,
    loaded: &LoadedDump,
    opts: &ReportOptions,
) -> io::Result<()> {
    let dump = &loaded.dump;
    writeln!(out, "Dump {} ({})", index + 1, loaded.title())?;

    if let Some(state) = opts.filter_state {
        let threads = filter_by_state(dump, state);
        writeln!(out, "Threads in state {} ({})", state, threads.len())?;
        for thread in threads {
            writeln!(out, "  {}", thread_line(thread))?;
        }
        return Ok(());
    }

    if opts.deadlocks_only {
        return write_deadlocks(out, dump);
    }

    writeln!(out, "Timestamp: {}", dump.timestamp.to_rfc3339())?;
    if let Some(version) = &dump.jvm_version {
        writeln!(out, "JVM: {version}")?;
    }
    writeln!(out, "Threads: {}", dump.threads.len())?;
    for (state, count) in compute_state_counts(dump) {
        writeln!(out, "  {state}: {count}")?;
    }

    write_deadlocks(out, dump)?;

    let contended = find_lock_contention_hotspots(dump, opts.min_waiters);
    if !contended.is_empty() {
        writeln!(out, "Contended locks:")?;
        for entry in contended {
            writeln!(out, "  {} - {} waiters", entry.lock, entry.waiters.len())?;
            if let Some(owner) = dump.threads.iter().find(|t| t.holds(&entry.lock.identity)) {
                writeln!(out, "    held by {}", thread_line(owner))?;
            }
            for waiter in entry.waiters {
                writeln!(out, "    {}", thread_line(waiter))?;
            }
        }
    }

    let hotspots = compute_stack_hotspots(dump, opts.hotspot_limit);
    if !hotspots.is_empty() {
        writeln!(out, "Top stack frames:")?;
        for hotspot in hotspots {
            writeln!(out, "  {:>4}  {}", hotspot.occurrences, hotspot.frame)?;
        }
    }

    let groups: Vec<_> = group_similar_threads(dump)
        .into_iter()
        .filter(|g| g.members.len() > 1)
        .collect();
    if !groups.is_empty() {
        writeln!(out, "Similar threads:")?;
        for group in groups {
            writeln!(
                out,
                "  {} x{} (top: {})",
                group.normalized_name,
                group.members.len(),
                group.members[0]
                    .top_frame()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<no stack>".to_string())
            )?;
        }
    }
    Ok(())
}

fn write_deadlocks(out: &mut impl Write, dump: &ThreadDump) -> io::Result<()> {
    let deadlocks = detect_deadlocks(dump);
    if deadlocks.is_empty() {
        return writeln!(out, "No deadlocks found");
    }
    for (n, deadlock) in deadlocks.iter().enumerate() {
        writeln!(out, "Deadlock {}", n + 1)?;
        for (thread, lock) in deadlock.threads.iter().zip(&deadlock.locks) {
            writeln!(out, "  {} waiting on {}", thread_line(thread), lock)?;
        }
    }
    Ok(())
}

pub fn write_timeline(out: &mut impl Write, dumps: &[LoadedDump]) -> io::Result<()> {
    for (index, loaded) in dumps.iter().enumerate() {
        writeln!(out, "Dump {} ({})", index + 1, loaded.title())?;
        for (state, count) in compute_state_counts(&loaded.dump) {
            writeln!(out, "  {state}: {count}")?;
        }
    }
    Ok(())
}

pub fn write_diff(out: &mut impl Write, dumps: &[LoadedDump]) -> io::Result<()> {
    if dumps.len() < 2 {
        return writeln!(out, "Diff needs at least two dumps");
    }
    for pair in dumps.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        writeln!(out, "Diff {} -> {}", before.title(), after.title())?;

        let delta = diff(&before.dump, &after.dump);
        writeln!(out, "New threads: {}", delta.new_threads.len())?;
        for thread in &delta.new_threads {
            writeln!(out, "  {}", thread_line(thread))?;
        }
        writeln!(out, "Disappeared threads: {}", delta.disappeared.len())?;
        for thread in &delta.disappeared {
            writeln!(out, "  {}", thread_line(thread))?;
        }

        let changes = find_state_changes(&before.dump, &after.dump);
        writeln!(out, "State changes: {}", changes.len())?;
        for change in changes {
            writeln!(
                out,
                "  \"{}\" #{} {} -> {}",
                change.thread.name, change.thread.id, change.previous, change.thread.state
            )?;
        }
    }
    Ok(())
}

pub fn write_high_cpu(out: &mut impl Write, dumps: &[LoadedDump]) -> io::Result<()> {
    let threads = find_high_cpu_threads(dumps);
    writeln!(out, "High CPU thread candidates: {}", threads.len())?;
    for thread in threads {
        writeln!(out, "  {}", thread_line(thread))?;
    }
    Ok(())
}

pub fn write_starvation(out: &mut impl Write, dumps: &[LoadedDump]) -> io::Result<()> {
    let pools = detect_thread_pool_starvation(dumps);
    writeln!(out, "Potential thread pool starvation: {}", pools.len())?;
    for pool in pools {
        writeln!(out, "  {pool}")?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON
// ─────────────────────────────────────────────────────────────────────────────

pub fn dump_json(loaded: &LoadedDump, opts: &ReportOptions) -> Value {
    let dump = &loaded.dump;
    let mut report = json!({
        "title": loaded.title(),
        "timestamp": dump.timestamp,
        "jvmVersion": dump.jvm_version,
        "threadCount": dump.threads.len(),
    });

    if let Some(state) = opts.filter_state {
        report["filterState"] = json!(state);
        report["threads"] = json!(filter_by_state(dump, state));
        return report;
    }

    report["deadlocks"] = json!(detect_deadlocks(dump));
    if opts.deadlocks_only {
        return report;
    }

    report["stateCounts"] = json!(compute_state_counts(dump));
    report["contendedLocks"] = json!(find_lock_contention_hotspots(dump, opts.min_waiters));
    report["stackHotspots"] = json!(compute_stack_hotspots(dump, opts.hotspot_limit));
    report["groups"] = json!(group_similar_threads(dump)
        .into_iter()
        .map(|g| json!({
            "key": g.key,
            "normalizedName": g.normalized_name,
            "threadIds": g.members.iter().map(|t| t.id).collect::<Vec<_>>(),
        }))
        .collect::<Vec<_>>());
    report
}

pub fn timeline_json(dumps: &[LoadedDump]) -> Value {
    dumps
        .iter()
        .map(|d| json!({ "title": d.title(), "stateCounts": compute_state_counts(&d.dump) }))
        .collect()
}

pub fn diff_json(dumps: &[LoadedDump]) -> Value {
    dumps
        .windows(2)
        .map(|pair| {
            let delta = diff(&pair[0].dump, &pair[1].dump);
            let changes: Vec<_> = find_state_changes(&pair[0].dump, &pair[1].dump)
                .into_iter()
                .map(|c| json!({ "id": c.thread.id, "name": c.thread.name, "from": c.previous, "to": c.thread.state }))
                .collect();
            json!({
                "before": pair[0].title(),
                "after": pair[1].title(),
                "newThreads": delta.new_threads,
                "disappearedThreads": delta.disappeared,
                "stateChanges": changes,
            })
        })
        .collect()
}

pub fn high_cpu_json(dumps: &[LoadedDump]) -> Value {
    json!(find_high_cpu_threads(dumps))
}

pub fn starvation_json(dumps: &[LoadedDump]) -> Value {
    json!(detect_thread_pool_starvation(dumps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use tdump_core::LockInfo;

    fn loaded(threads: Vec<ThreadInfo>) -> LoadedDump {
        LoadedDump::new("dump.txt", Arc::new(ThreadDump::new(Utc::now(), threads)))
    }

    fn opts() -> ReportOptions {
        ReportOptions {
            deadlocks_only: false,
            filter_state: None,
            hotspot_limit: 5,
            min_waiters: 2,
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn deadlocked() -> LoadedDump {
        let lock = |id: &str| LockInfo::new("java.lang.Object", id);
        loaded(vec![
            ThreadInfo::new(1, "a", ThreadState::Blocked)
                .with_locked(lock("0x1"))
                .with_waiting_on(lock("0x2")),
            ThreadInfo::new(2, "b", ThreadState::Blocked)
                .with_locked(lock("0x2"))
                .with_waiting_on(lock("0x1")),
        ])
    }

    #[test]
    fn test_filter_state_heading() {
        let d = loaded(vec![
            ThreadInfo::new(1, "main", ThreadState::Runnable),
            ThreadInfo::new(2, "idle", ThreadState::Waiting),
        ]);
        let options = ReportOptions {
            filter_state: Some(ThreadState::Runnable),
            ..opts()
        };
        let text = render(|out| write_dump(out, 0, &d, &options));
        assert!(text.contains("Threads in state RUNNABLE (1)"));
        assert!(text.contains("\"main\" #1"));
        assert!(!text.contains("idle"));
    }

    #[test]
    fn test_deadlocks_only() {
        let options = ReportOptions {
            deadlocks_only: true,
            ..opts()
        };
        let text = render(|out| write_dump(out, 0, &deadlocked(), &options));
        assert!(text.contains("Deadlock 1"));
        assert!(!text.contains("Threads:"));
    }

    #[test]
    fn test_full_report_sections() {
        let text = render(|out| write_dump(out, 0, &deadlocked(), &opts()));
        assert!(text.starts_with("Dump 1 (dump.txt)"));
        assert!(text.contains("BLOCKED: 2"));
        assert!(text.contains("Deadlock 1"));
    }

    #[test]
    fn test_contended_lock_names_owner() {
        let lock = LockInfo::new("java.lang.Object", "0xabc");
        let d = loaded(vec![
            ThreadInfo::new(1, "owner", ThreadState::Runnable).with_locked(lock.clone()),
            ThreadInfo::new(2, "w1", ThreadState::Blocked).with_waiting_on(lock.clone()),
            ThreadInfo::new(3, "w2", ThreadState::Blocked).with_waiting_on(lock),
        ]);
        let text = render(|out| write_dump(out, 0, &d, &opts()));
        assert!(text.contains("Contended locks:"));
        assert!(text.contains("held by \"owner\" #1 RUNNABLE"));
        assert!(text.contains("\"w2\" #3 BLOCKED"));
    }

    #[test]
    fn test_diff_needs_two_dumps() {
        let text = render(|out| write_diff(out, &[deadlocked()]));
        assert!(text.contains("at least two"));
    }

    #[test]
    fn test_dump_json_shape() {
        let value = dump_json(&deadlocked(), &opts());
        assert_eq!(value["threadCount"], 2);
        assert_eq!(value["stateCounts"]["BLOCKED"], 2);
        assert_eq!(value["deadlocks"].as_array().unwrap().len(), 1);
        assert_eq!(value["deadlocks"][0]["threads"][0]["name"], "a");
    }
}
