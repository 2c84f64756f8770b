//! An ordered collection of dumps from one process, analysed together.

use std::collections::BTreeMap;
use std::sync::Arc;

use tdump_core::{ThreadDump, ThreadInfo, ThreadState};
use tracing::debug;

use crate::compare::{self, ThreadDelta};
use crate::counts;

/// Dumps in capture order. Shared with the cache, so dumps are held behind `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    dumps: Vec<Arc<ThreadDump>>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, dump: impl Into<Arc<ThreadDump>>) {
        self.dumps.push(dump.into());
        debug!("Session now holds {} dumps", self.dumps.len());
    }

    pub fn dumps(&self) -> &[Arc<ThreadDump>] {
        &self.dumps
    }

    pub fn latest(&self) -> Option<&ThreadDump> {
        self.dumps.last().map(|d| &**d)
    }

    pub fn len(&self) -> usize {
        self.dumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dumps.is_empty()
    }

    pub fn timeline(&self) -> Vec<BTreeMap<ThreadState, usize>> {
        counts::compute_state_timeline(&self.dumps)
    }

    pub fn high_cpu_threads(&self) -> Vec<&ThreadInfo> {
        compare::find_high_cpu_threads(&self.dumps)
    }

    pub fn starved_pools(&self) -> Vec<String> {
        compare::detect_thread_pool_starvation(&self.dumps)
    }

    /// Diff of the two most recent dumps, if there are at least two.
    pub fn latest_diff(&self) -> Option<ThreadDelta<'_>> {
        match self.dumps.as_slice() {
            [.., previous, current] => Some(compare::diff(previous, current)),
            _ => None,
        }
    }
}

impl FromIterator<Arc<ThreadDump>> for AnalysisSession {
    fn from_iter<I: IntoIterator<Item = Arc<ThreadDump>>>(iter: I) -> Self {
        Self {
            dumps: iter.into_iter().collect(),
        }
    }
}
