//! Per-state thread counts and state filtering.

use std::collections::BTreeMap;

use tdump_core::{ThreadDump, ThreadInfo, ThreadState};

/// Thread count per state, ordered by [`ThreadState`]. States with no threads are absent.
pub fn compute_state_counts(dump: &ThreadDump) -> BTreeMap<ThreadState, usize> {
    let mut counts = BTreeMap::new();
    for thread in &dump.threads {
        *counts.entry(thread.state).or_insert(0) += 1;
    }
    counts
}

/// State counts for each dump, in input order.
pub fn compute_state_timeline<D: AsRef<ThreadDump>>(
    dumps: &[D],
) -> Vec<BTreeMap<ThreadState, usize>> {
    dumps
        .iter()
        .map(|d| compute_state_counts(d.as_ref()))
        .collect()
}

pub fn filter_by_state(dump: &ThreadDump, state: ThreadState) -> Vec<&ThreadInfo> {
    dump.threads.iter().filter(|t| t.state == state).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dump(states: &[ThreadState]) -> ThreadDump {
        let threads = states
            .iter()
            .enumerate()
            .map(|(i, s)| ThreadInfo::new(i as i64, format!("t-{i}"), *s))
            .collect();
        ThreadDump::new(Utc::now(), threads)
    }

    #[test]
    fn test_counts_sum_to_thread_count() {
        let d = dump(&[
            ThreadState::Runnable,
            ThreadState::Waiting,
            ThreadState::Runnable,
            ThreadState::Blocked,
        ]);
        let counts = compute_state_counts(&d);
        assert_eq!(counts.values().sum::<usize>(), d.threads.len());
        assert_eq!(counts[&ThreadState::Runnable], 2);
    }

    #[test]
    fn test_zero_count_states_omitted() {
        let counts = compute_state_counts(&dump(&[ThreadState::Runnable, ThreadState::Waiting]));
        assert_eq!(counts.len(), 2);
        assert!(!counts.contains_key(&ThreadState::Blocked));
    }

    #[test]
    fn test_counts_are_ordered_by_state() {
        let counts = compute_state_counts(&dump(&[
            ThreadState::TimedWaiting,
            ThreadState::New,
            ThreadState::Runnable,
        ]));
        let keys: Vec<_> = counts.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                ThreadState::New,
                ThreadState::Runnable,
                ThreadState::TimedWaiting
            ]
        );
    }

    #[test]
    fn test_empty_dump() {
        assert!(compute_state_counts(&dump(&[])).is_empty());
    }

    #[test]
    fn test_timeline_preserves_order() {
        let dumps = vec![
            dump(&[ThreadState::Runnable]),
            dump(&[ThreadState::Blocked, ThreadState::Blocked]),
        ];
        let timeline = compute_state_timeline(&dumps);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0][&ThreadState::Runnable], 1);
        assert_eq!(timeline[1][&ThreadState::Blocked], 2);
    }

    #[test]
    fn test_filter_by_state() {
        let d = dump(&[
            ThreadState::Waiting,
            ThreadState::Runnable,
            ThreadState::Waiting,
        ]);
        let waiting = filter_by_state(&d, ThreadState::Waiting);
        let ids: Vec<_> = waiting.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(filter_by_state(&d, ThreadState::Terminated).is_empty());
    }
}
