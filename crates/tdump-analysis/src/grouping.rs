//! Grouping of threads that share a pool name and an identical stack.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tdump_core::{ThreadDump, ThreadInfo};

/// One trailing `-N` / `_N` / `N` suffix
static NUMERIC_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]?\d+$").expect("Invalid NUMERIC_SUFFIX_REGEX"));

const SIGNATURE_SEPARATOR: &str = ";";
const KEY_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Serialize)]
pub struct ThreadGroup<'a> {
    /// `normalized_name::stack_signature`
    pub key: String,
    pub normalized_name: String,
    pub members: Vec<&'a ThreadInfo>,
}

/// Strip one trailing separator+digits suffix: `pool-1-thread-7` becomes `pool-1-thread`.
pub fn normalize_thread_name(name: &str) -> String {
    NUMERIC_SUFFIX_REGEX.replace(name, "").into_owned()
}

/// Frames in their canonical string form, joined with `;`.
pub fn stack_signature(thread: &ThreadInfo) -> String {
    thread
        .stack
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(SIGNATURE_SEPARATOR)
}

/// Groups keyed by normalized name plus stack signature, in order of first member.
pub fn group_similar_threads(dump: &ThreadDump) -> Vec<ThreadGroup<'_>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ThreadGroup<'_>> = Vec::new();

    for thread in &dump.threads {
        let normalized_name = normalize_thread_name(&thread.name);
        let key = format!(
            "{normalized_name}{KEY_SEPARATOR}{}",
            stack_signature(thread)
        );
        match slots.get(&key) {
            Some(&slot) => groups[slot].members.push(thread),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push(ThreadGroup {
                    key,
                    normalized_name,
                    members: vec![thread],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tdump_core::{StackFrame, ThreadState};

    #[test]
    fn test_normalize_thread_name() {
        assert_eq!(normalize_thread_name("pool-1-thread-1"), "pool-1-thread");
        assert_eq!(normalize_thread_name("worker_12"), "worker");
        assert_eq!(normalize_thread_name("Thread42"), "Thread");
        assert_eq!(normalize_thread_name("main"), "main");
        assert_eq!(normalize_thread_name("42"), "");
    }

    #[test]
    fn test_pool_threads_share_group() {
        let dump = ThreadDump::new(
            Utc::now(),
            vec![
                ThreadInfo::new(1, "pool-1-thread-1", ThreadState::Waiting),
                ThreadInfo::new(2, "pool-1-thread-2", ThreadState::Waiting),
            ],
        );
        let groups = group_similar_threads(&dump);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].normalized_name, "pool-1-thread");
        assert_eq!(groups[0].key, "pool-1-thread::");
        assert_eq!(groups[0].members.len(), 2);
    }

    #[test]
    fn test_different_stacks_split_group() {
        let frame = StackFrame::new("example.Task", "run", "Task.java", 3);
        let dump = ThreadDump::new(
            Utc::now(),
            vec![
                ThreadInfo::new(1, "worker-1", ThreadState::Runnable).with_stack(vec![frame]),
                ThreadInfo::new(2, "worker-2", ThreadState::Runnable),
            ],
        );
        let groups = group_similar_threads(&dump);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "worker::example.Task.run(Task.java:3)");
    }

    #[test]
    fn test_stack_signature_joins_frames() {
        let thread = ThreadInfo::new(1, "t", ThreadState::Runnable).with_stack(vec![
            StackFrame::new("A", "a", "A.java", 1),
            StackFrame::new("B", "b", "B.java", 2),
        ]);
        assert_eq!(stack_signature(&thread), "A.a(A.java:1);B.b(B.java:2)");
    }
}
