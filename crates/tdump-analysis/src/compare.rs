//! Multi-dump comparisons: diff, state changes, high-CPU candidates and pool starvation.
//!
//! Threads are joined across dumps by `id`. Lock identities are never compared across dumps.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tdump_core::{ThreadDump, ThreadInfo, ThreadState};

use crate::grouping::normalize_thread_name;

/// Threads that appeared or disappeared between two dumps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreadDelta<'a> {
    /// Only in the current dump, in its order
    pub new_threads: Vec<&'a ThreadInfo>,
    /// Only in the previous dump, in its order
    pub disappeared: Vec<&'a ThreadInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateChange<'a> {
    /// The thread as it appears in the later dump
    pub thread: &'a ThreadInfo,
    pub previous: ThreadState,
}

pub fn diff<'a>(previous: &'a ThreadDump, current: &'a ThreadDump) -> ThreadDelta<'a> {
    let previous_ids = ids(previous);
    let current_ids = ids(current);

    ThreadDelta {
        new_threads: current
            .threads
            .iter()
            .filter(|t| !previous_ids.contains(&t.id))
            .collect(),
        disappeared: previous
            .threads
            .iter()
            .filter(|t| !current_ids.contains(&t.id))
            .collect(),
    }
}

/// Threads present in both dumps whose state differs, in `after` order.
pub fn find_state_changes<'a>(before: &ThreadDump, after: &'a ThreadDump) -> Vec<StateChange<'a>> {
    let earlier: HashMap<i64, ThreadState> =
        before.threads.iter().map(|t| (t.id, t.state)).collect();

    after
        .threads
        .iter()
        .filter_map(|thread| {
            let previous = *earlier.get(&thread.id)?;
            (previous != thread.state).then_some(StateChange { thread, previous })
        })
        .collect()
}

/// Threads runnable in every dump. Fewer than two dumps yields nothing.
///
/// Returned threads are the first dump's records, in its order.
pub fn find_high_cpu_threads<D: AsRef<ThreadDump>>(dumps: &[D]) -> Vec<&ThreadInfo> {
    let [first, rest @ ..] = dumps else {
        return Vec::new();
    };
    if rest.is_empty() {
        return Vec::new();
    }

    let first = first.as_ref();
    let mut candidates: HashSet<i64> = runnable_ids(first);
    for dump in rest {
        if candidates.is_empty() {
            break;
        }
        let runnable = runnable_ids(dump.as_ref());
        candidates.retain(|id| runnable.contains(id));
    }

    first
        .threads
        .iter()
        .filter(|t| t.state.is_runnable() && candidates.contains(&t.id))
        .collect()
}

/// Pool names whose every thread, in every dump, is blocked or waiting. First-seen order.
pub fn detect_thread_pool_starvation<D: AsRef<ThreadDump>>(dumps: &[D]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut starved: HashMap<String, bool> = HashMap::new();

    for thread in dumps.iter().flat_map(|d| &d.as_ref().threads) {
        let pool = normalize_thread_name(&thread.name);
        let blocking = thread.state.is_blocking();
        match starved.get_mut(&pool) {
            Some(all_blocking) => *all_blocking &= blocking,
            None => {
                order.push(pool.clone());
                starved.insert(pool, blocking);
            }
        }
    }

    order
        .into_iter()
        .filter(|pool| starved.get(pool).copied().unwrap_or(false))
        .collect()
}

fn ids(dump: &ThreadDump) -> HashSet<i64> {
    dump.threads.iter().map(|t| t.id).collect()
}

fn runnable_ids(dump: &ThreadDump) -> HashSet<i64> {
    dump.threads
        .iter()
        .filter(|t| t.state.is_runnable())
        .map(|t| t.id)
        .collect()
}
