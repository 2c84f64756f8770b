//! # tdump-core - Canonical Thread Dump Model
//!
//! Foundation crate for the thread dump analyzer. Provides the canonical model that every
//! parser produces and every analysis consumes, plus error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Model (`model`)
//! - [`ThreadDump`] - One snapshot of all threads, in parse order
//! - [`ThreadInfo`] - A thread with state, stack and lock information
//! - [`StackFrame`] - A call frame, compared by value
//! - [`LockInfo`] - A monitor identified by a per-dump identity token
//! - [`ThreadState`] - Canonical thread state
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Per-input error enum
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use tdump_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod model;
pub mod prelude;

pub use error::{Error, Result, ResultExt};
pub use model::{LockInfo, StackFrame, ThreadDump, ThreadInfo, ThreadState};
