//! Accumulator shared by the line-oriented parsers.
//!
//! Each text parser drives a [`ThreadScanner`] through two states: `Idle` before the first
//! thread header, `InThread` while a record is being filled. A new header or the end of input
//! is the only transition that emits a finished [`ThreadInfo`].

use tdump_core::{LockInfo, StackFrame, ThreadInfo, ThreadState};

use crate::lines::BodyLine;

// ─────────────────────────────────────────────────────────────────────────────
// Thread Record
// ─────────────────────────────────────────────────────────────────────────────

/// The in-progress thread while its block is being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub name: String,
    pub id: i64,
    pub state: ThreadState,
    pub stack: Vec<StackFrame>,
    pub locked_monitors: Vec<LockInfo>,
    pub waiting_on: Option<LockInfo>,
    pub priority: Option<i32>,
    pub daemon: Option<bool>,
}

impl ThreadRecord {
    /// Fresh record seeded from a header. State starts as `NEW` until a hint or state line.
    pub fn new(name: impl Into<String>, id: i64) -> Self {
        Self {
            name: name.into(),
            id,
            state: ThreadState::New,
            stack: Vec::new(),
            locked_monitors: Vec::new(),
            waiting_on: None,
            priority: None,
            daemon: None,
        }
    }

    pub fn apply(&mut self, line: BodyLine) {
        match line {
            BodyLine::State(state) => self.state = state,
            BodyLine::Frame(frame) => self.stack.push(frame),
            BodyLine::WaitingToLock(lock) | BodyLine::ParkingFor(lock) => {
                self.waiting_on = Some(lock)
            }
            BodyLine::Locked(lock) => self.locked_monitors.push(lock),
        }
    }

    fn into_thread(self) -> ThreadInfo {
        ThreadInfo {
            id: self.id,
            name: self.name,
            state: self.state,
            stack: self.stack,
            locked_monitors: self.locked_monitors,
            waiting_on: self.waiting_on,
            priority: self.priority,
            daemon: self.daemon,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scanner
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum ScanState {
    /// Before the first thread header
    Idle,

    /// Accumulating the body of a thread
    InThread(ThreadRecord),
}

/// Output sequence plus the one mutable "current record".
#[derive(Debug)]
pub struct ThreadScanner {
    state: ScanState,
    threads: Vec<ThreadInfo>,
}

impl ThreadScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            threads: Vec::new(),
        }
    }

    /// A header was seen: flush the previous record and start this one.
    pub fn begin(&mut self, record: ThreadRecord) {
        self.flush();
        self.state = ScanState::InThread(record);
    }

    /// The record being filled, or `None` while still before the first header.
    pub fn current(&mut self) -> Option<&mut ThreadRecord> {
        match &mut self.state {
            ScanState::Idle => None,
            ScanState::InThread(record) => Some(record),
        }
    }

    /// End of input: flush the in-progress record and hand back every thread in parse order.
    pub fn finish(mut self) -> Vec<ThreadInfo> {
        self.flush();
        self.threads
    }

    fn flush(&mut self) {
        if let ScanState::InThread(record) = std::mem::replace(&mut self.state, ScanState::Idle) {
            self.threads.push(record.into_thread());
        }
    }
}

impl Default for ThreadScanner {
    fn default() -> Self {
        Self::new()
    }
}
