//! Canonical thread dump model.
//!
//! Every parser produces a [`ThreadDump`] and every analysis consumes one. The types are plain
//! values: once a parser hands a dump out it is never mutated, and shared copies are passed
//! around behind `Arc`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Thread State
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical thread state, in the order reports list them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadState {
    /// Header seen but no state reported yet
    #[default]
    New,
    Runnable,
    Blocked,
    Waiting,
    TimedWaiting,
    Terminated,
}

impl ThreadState {
    pub const ALL: [ThreadState; 6] = [
        ThreadState::New,
        ThreadState::Runnable,
        ThreadState::Blocked,
        ThreadState::Waiting,
        ThreadState::TimedWaiting,
        ThreadState::Terminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadState::New => "NEW",
            ThreadState::Runnable => "RUNNABLE",
            ThreadState::Blocked => "BLOCKED",
            ThreadState::Waiting => "WAITING",
            ThreadState::TimedWaiting => "TIMED_WAITING",
            ThreadState::Terminated => "TERMINATED",
        }
    }

    /// Exact match against the canonical upper-case names.
    pub fn from_canonical(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == token)
    }

    /// Canonical match with the documented soft default.
    pub fn from_canonical_or_runnable(token: &str) -> Self {
        Self::from_canonical(token).unwrap_or(ThreadState::Runnable)
    }

    pub fn is_runnable(&self) -> bool {
        *self == ThreadState::Runnable
    }

    /// Parked on something: waiting, blocked or timed-waiting.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ThreadState::Blocked | ThreadState::Waiting | ThreadState::TimedWaiting
        )
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadState {
    type Err = String;

    /// Case-insensitive; accepts `-` in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::from_canonical(&normalized).ok_or_else(|| format!("unknown thread state: {s}"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frames and Locks
// ─────────────────────────────────────────────────────────────────────────────

/// One call frame. Equality and hashing are by value, so frames can key frequency maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
    pub file_name: String,
    /// -1 when absent or unparsable
    pub line_number: i32,
}

impl StackFrame {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: impl Into<String>,
        line_number: i32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: file_name.into(),
            line_number,
        }
    }
}

impl fmt::Display for StackFrame {
    /// `Class.method(File:line)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({}:{})",
            self.class_name, self.method_name, self.file_name, self.line_number
        )
    }
}

/// A monitor or lock instance. `identity` is only meaningful inside the dump it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
    pub class_name: String,
    pub identity: String,
}

impl LockInfo {
    pub fn new(class_name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            identity: identity.into(),
        }
    }
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> ({})", self.identity, self.class_name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Threads
// ─────────────────────────────────────────────────────────────────────────────

/// A single thread captured in a dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadInfo {
    /// Join key across dumps; -1 when the dump carried no usable id
    pub id: i64,
    pub name: String,
    pub state: ThreadState,
    /// Innermost frame first
    pub stack: Vec<StackFrame>,
    pub locked_monitors: Vec<LockInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_on: Option<LockInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon: Option<bool>,
}

impl ThreadInfo {
    pub fn new(id: i64, name: impl Into<String>, state: ThreadState) -> Self {
        Self {
            id,
            name: name.into(),
            state,
            stack: Vec::new(),
            locked_monitors: Vec::new(),
            waiting_on: None,
            priority: None,
            daemon: None,
        }
    }

    pub fn with_stack(mut self, stack: Vec<StackFrame>) -> Self {
        self.stack = stack;
        self
    }

    pub fn with_locked(mut self, lock: LockInfo) -> Self {
        self.locked_monitors.push(lock);
        self
    }

    pub fn with_waiting_on(mut self, lock: LockInfo) -> Self {
        self.waiting_on = Some(lock);
        self
    }

    /// Innermost frame, if the stack is non-empty.
    pub fn top_frame(&self) -> Option<&StackFrame> {
        self.stack.first()
    }

    pub fn holds(&self, identity: &str) -> bool {
        self.locked_monitors.iter().any(|l| l.identity == identity)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dump
// ─────────────────────────────────────────────────────────────────────────────

/// One snapshot of all threads, threads kept in parse order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDump {
    pub timestamp: DateTime<Utc>,
    pub threads: Vec<ThreadInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jvm_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_millis: Option<i64>,
}

impl ThreadDump {
    pub fn new(timestamp: DateTime<Utc>, threads: Vec<ThreadInfo>) -> Self {
        Self {
            timestamp,
            threads,
            label: None,
            jvm_version: None,
            uptime_millis: None,
        }
    }

    /// A labelled copy. Cached dumps are shared, so labels are never set in place.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self.clone()
        }
    }

    /// First thread carrying `id`, in dump order.
    pub fn thread_by_id(&self, id: i64) -> Option<&ThreadInfo> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl AsRef<ThreadDump> for ThreadDump {
    fn as_ref(&self) -> &ThreadDump {
        self
    }
}
