//! # tdump-analysis - Thread Dump Analyses and Result Cache
//!
//! Stateless analyses over parsed [`ThreadDump`](tdump_core::ThreadDump) values, plus the
//! content-addressed [`DumpCache`] and the multi-dump [`AnalysisSession`].
//!
//! Results borrow from the dumps they were computed on and list items in a deterministic
//! order (dump order or first-seen order).
//!
//! ## Single dump
//! - [`compute_state_counts()`] / [`filter_by_state()`]
//! - [`detect_deadlocks()`] - wait-for cycles
//! - [`find_lock_contention_hotspots()`] - locks with several waiters
//! - [`compute_stack_hotspots()`] - most frequent frames
//! - [`group_similar_threads()`] - pool name plus identical stack
//!
//! ## Several dumps
//! - [`compute_state_timeline()`]
//! - [`diff()`] / [`find_state_changes()`]
//! - [`find_high_cpu_threads()`] / [`detect_thread_pool_starvation()`]

pub mod cache;
pub mod compare;
pub mod contention;
pub mod counts;
pub mod deadlock;
pub mod grouping;
pub mod hotspots;
pub mod session;

pub use cache::{DumpCache, DEFAULT_CACHE_CAPACITY};
pub use compare::{
    detect_thread_pool_starvation, diff, find_high_cpu_threads, find_state_changes, StateChange,
    ThreadDelta,
};
pub use contention::{find_lock_contention_hotspots, LockContention, DEFAULT_MIN_WAITERS};
pub use counts::{compute_state_counts, compute_state_timeline, filter_by_state};
pub use deadlock::{detect_deadlocks, Deadlock};
pub use grouping::{group_similar_threads, normalize_thread_name, stack_signature, ThreadGroup};
pub use hotspots::{compute_stack_hotspots, FrameHotspot, DEFAULT_HOTSPOT_LIMIT};
pub use session::AnalysisSession;
