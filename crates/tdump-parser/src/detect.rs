//! Format detection and parser dispatch.
//!
//! The five supported families form a closed set. Detection sniffs the first
//! [`DETECTION_SNIFF_LINES`] lines of the (already decompressed) input without consuming it.

use std::borrow::Cow;
use std::fmt;

use tdump_core::{Result, ThreadDump};
use tracing::debug;

use crate::{android, hotspot, hs_err, json, openj9};

/// Number of leading lines inspected when sniffing the format
pub const DETECTION_SNIFF_LINES: usize = 10;

/// A supported thread dump family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DumpFormat {
    /// `jstack` / `kill -3` output; also the fallback when nothing else matches
    #[default]
    HotSpot,

    /// `hs_err_pid<N>.log` crash log
    HsErr,

    /// OpenJ9 / IBM javacore
    OpenJ9,

    /// Android ART trace
    AndroidArt,

    /// Structured JSON document
    Json,
}

impl DumpFormat {
    pub const ALL: [DumpFormat; 5] = [
        DumpFormat::HotSpot,
        DumpFormat::HsErr,
        DumpFormat::OpenJ9,
        DumpFormat::AndroidArt,
        DumpFormat::Json,
    ];

    /// Human readable family name
    pub fn display_name(&self) -> &'static str {
        match self {
            DumpFormat::HotSpot => "HotSpot",
            DumpFormat::HsErr => "hs_err_pid",
            DumpFormat::OpenJ9 => "OpenJ9",
            DumpFormat::AndroidArt => "Android ART",
            DumpFormat::Json => "JSON",
        }
    }

    /// Classify decoded input by its leading lines. Never fails: no match means HotSpot.
    pub fn detect(input: &[u8]) -> Self {
        let header = sniff_header(input);
        let format = classify_header(&header);
        debug!("Detected {} dump format", format.display_name());
        format
    }

    /// Run this format's parser over decoded input.
    pub fn parse(self, input: &[u8]) -> Result<ThreadDump> {
        let text = String::from_utf8_lossy(input);
        match self {
            DumpFormat::HotSpot => Ok(hotspot::parse(&text)),
            DumpFormat::HsErr => Ok(hs_err::parse(&text)),
            DumpFormat::OpenJ9 => Ok(openj9::parse(&text)),
            DumpFormat::AndroidArt => Ok(android::parse(&text)),
            DumpFormat::Json => json::parse(&text),
        }
    }
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The first lines of input joined with `\n`, decoded leniently.
fn sniff_header(input: &[u8]) -> String {
    input
        .split(|b| *b == b'\n')
        .take(DETECTION_SNIFF_LINES)
        .map(String::from_utf8_lossy)
        .map(Cow::into_owned)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markers checked in priority order.
fn classify_header(header: &str) -> DumpFormat {
    if header.contains("Full thread dump") || header.contains("Full Java thread dump") {
        return DumpFormat::HotSpot;
    }
    if header.contains("hs_err_pid") {
        return DumpFormat::HsErr;
    }
    if header.contains("1XMTHREADINFO") {
        return DumpFormat::OpenJ9;
    }
    if header.contains("sysTid=") || header.contains("sCount=") || header.contains("| state=") {
        return DumpFormat::AndroidArt;
    }
    if header
        .trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with('{')
    {
        return DumpFormat::Json;
    }
    DumpFormat::HotSpot
}
