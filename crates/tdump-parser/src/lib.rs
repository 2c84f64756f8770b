//! # tdump-parser - Thread Dump Format Detection and Parsing
//!
//! Turns raw dump bytes into the canonical [`ThreadDump`] model. Input may be gzip-compressed;
//! the format is sniffed from the leading lines and dispatched to one of five parsers.
//!
//! ## Public API
//!
//! - [`parse_bytes()`] - Decode, detect and parse an in-memory dump
//! - [`parse_reader()`] - Same, reading the whole stream first
//! - [`parse_file()`] - Same, from a path
//! - [`DumpFormat`] - The supported families, with `detect` and `parse`
//! - [`supported_formats()`] - Human readable family names
//!
//! Text parsers never fail on content: unparsable numbers become -1 and unknown state
//! tokens become `RUNNABLE`. Only I/O, corrupt gzip framing and malformed JSON are errors.

pub mod android;
pub mod detect;
pub mod hotspot;
pub mod hs_err;
pub mod input;
pub mod json;
pub mod lines;
pub mod openj9;
pub mod record;

use std::io::Read;
use std::path::Path;

use tdump_core::prelude::*;
use tdump_core::ThreadDump;

pub use detect::{DumpFormat, DETECTION_SNIFF_LINES};
pub use input::{is_gzip, GZIP_MAGIC};

/// Decode (gzip), detect and parse one dump held in memory.
pub fn parse_bytes(input: &[u8]) -> Result<ThreadDump> {
    let decoded = input::decode(input)?;
    let format = DumpFormat::detect(&decoded);
    let dump = format.parse(&decoded)?;
    debug!(
        "Parsed {} dump with {} threads",
        format.display_name(),
        dump.threads.len()
    );
    Ok(dump)
}

/// Read the stream to its end, then behave like [`parse_bytes`].
pub fn parse_reader<R: Read>(mut reader: R) -> Result<ThreadDump> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes(&bytes)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<ThreadDump> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_bytes(&bytes)
}

/// Names of the supported dump families, in detection priority order.
pub fn supported_formats() -> Vec<&'static str> {
    DumpFormat::ALL.iter().map(|f| f.display_name()).collect()
}
