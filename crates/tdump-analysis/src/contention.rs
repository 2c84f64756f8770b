//! Lock contention hotspots: monitors with several simultaneous waiters.

use std::collections::HashMap;

use serde::Serialize;
use tdump_core::{LockInfo, ThreadDump, ThreadInfo};

/// Smallest waiter count reported by default
pub const DEFAULT_MIN_WAITERS: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct LockContention<'a> {
    /// The lock as seen by its first waiter
    pub lock: &'a LockInfo,
    /// Waiting threads, in dump order
    pub waiters: Vec<&'a ThreadInfo>,
}

/// Locks with at least `min_waiters` waiting threads, in order of first waiter.
pub fn find_lock_contention_hotspots(
    dump: &ThreadDump,
    min_waiters: usize,
) -> Vec<LockContention<'_>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<LockContention<'_>> = Vec::new();

    for thread in &dump.threads {
        let Some(lock) = thread.waiting_on.as_ref() else {
            continue;
        };
        let slot = *slots.entry(lock.identity.as_str()).or_insert_with(|| {
            groups.push(LockContention {
                lock,
                waiters: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].waiters.push(thread);
    }

    groups.retain(|g| g.waiters.len() >= min_waiters);
    groups
}
