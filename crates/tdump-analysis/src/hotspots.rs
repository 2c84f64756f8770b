//! Most frequent stack frames across all threads of a dump.

use std::collections::HashMap;

use serde::Serialize;
use tdump_core::{StackFrame, ThreadDump};

/// Number of frames reported by default
pub const DEFAULT_HOTSPOT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameHotspot<'a> {
    pub frame: &'a StackFrame,
    pub occurrences: usize,
}

/// Top `limit` frames by descending occurrence count. Equal counts keep first-seen order.
pub fn compute_stack_hotspots(dump: &ThreadDump, limit: usize) -> Vec<FrameHotspot<'_>> {
    let mut slots: HashMap<&StackFrame, usize> = HashMap::new();
    let mut hotspots: Vec<FrameHotspot<'_>> = Vec::new();

    for frame in dump.threads.iter().flat_map(|t| &t.stack) {
        match slots.get(frame) {
            Some(&slot) => hotspots[slot].occurrences += 1,
            None => {
                slots.insert(frame, hotspots.len());
                hotspots.push(FrameHotspot {
                    frame,
                    occurrences: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among ties
    hotspots.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    hotspots.truncate(limit);
    hotspots
}
