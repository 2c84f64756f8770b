//! Deadlock detection over the wait-for graph of a single dump.
//!
//! Graph nodes are indices into [`ThreadDump::threads`], never thread values: two threads can
//! carry identical visible fields and must still be distinct nodes. Each thread has at most one
//! outgoing edge (to the owner of the lock it waits on), so the graph is a functional graph and a
//! single pass over chains finds every cycle exactly once.

use std::collections::HashMap;

use serde::Serialize;
use tdump_core::{LockInfo, ThreadDump, ThreadInfo};
use tracing::debug;

/// One wait-for cycle: its member threads and the lock each of them is blocked on,
/// index-aligned.
#[derive(Debug, Clone, Serialize)]
pub struct Deadlock<'a> {
    pub threads: Vec<&'a ThreadInfo>,
    pub locks: Vec<&'a LockInfo>,
}

impl Deadlock<'_> {
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn contains_thread(&self, id: i64) -> bool {
        self.threads.iter().any(|t| t.id == id)
    }
}

/// An edge `waiter -> owner`, labelled with the lock being waited on.
#[derive(Debug, Clone, Copy)]
struct WaitEdge<'a> {
    owner: usize,
    lock: &'a LockInfo,
}

pub fn detect_deadlocks(dump: &ThreadDump) -> Vec<Deadlock<'_>> {
    let edges = wait_for_edges(dump);
    let mut visited = vec![false; dump.threads.len()];
    let mut deadlocks = Vec::new();

    for start in 0..dump.threads.len() {
        if visited[start] || edges[start].is_none() {
            continue;
        }

        let mut chain: Vec<usize> = Vec::new();
        let mut position: HashMap<usize, usize> = HashMap::new();
        let mut cycle_start = None;
        let mut node = start;

        loop {
            if let Some(&pos) = position.get(&node) {
                cycle_start = Some(pos);
                break;
            }
            if visited[node] {
                break;
            }
            position.insert(node, chain.len());
            chain.push(node);
            match edges[node] {
                Some(edge) => node = edge.owner,
                None => break,
            }
        }

        for &idx in &chain {
            visited[idx] = true;
        }

        if let Some(pos) = cycle_start {
            let members = &chain[pos..];
            let deadlock = Deadlock {
                threads: members.iter().map(|&i| &dump.threads[i]).collect(),
                locks: members
                    .iter()
                    .filter_map(|&i| edges[i].map(|e| e.lock))
                    .collect(),
            };
            debug!("Found deadlock cycle of {} threads", deadlock.len());
            deadlocks.push(deadlock);
        }
    }

    deadlocks
}

/// Per-thread outgoing edge, indexed like `dump.threads`.
fn wait_for_edges(dump: &ThreadDump) -> Vec<Option<WaitEdge<'_>>> {
    let mut owners: HashMap<&str, usize> = HashMap::new();
    for (idx, thread) in dump.threads.iter().enumerate() {
        for lock in &thread.locked_monitors {
            // last writer wins on duplicated ownership
            owners.insert(lock.identity.as_str(), idx);
        }
    }

    dump.threads
        .iter()
        .enumerate()
        .map(|(idx, thread)| {
            let lock = thread.waiting_on.as_ref()?;
            let owner = *owners.get(lock.identity.as_str())?;
            (owner != idx).then_some(WaitEdge { owner, lock })
        })
        .collect()
}
