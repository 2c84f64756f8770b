//! Shared imports for the tdump crates: the error types and the tracing macros the
//! parsers, analyses and CLI log through.

pub use crate::error::{Error, Result, ResultExt};
pub use tracing::{debug, error, info, trace, warn};
