//! Error types for trace extraction and capture file output.

use std::fmt;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::record::SessionState;

/// Why a trace log could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOpenKind {
    /// The tracing subsystem reported the file as corrupt.
    Corrupt,
    /// Any other open failure (missing file, access denied, ...).
    Other,
}

impl fmt::Display for TraceOpenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceOpenKind::Corrupt => write!(f, "the file is corrupted"),
            TraceOpenKind::Other => write!(f, "the file could not be opened"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open trace '{}': {kind} (status {code:#010x})", .path.display())]
    TraceOpen {
        path: PathBuf,
        kind: TraceOpenKind,
        code: u32,
    },

    #[error("trace processing failed for '{}' with status {code:#010x}", .path.display())]
    TraceProcessing { path: PathBuf, code: u32 },

    #[error("cannot read '{}': ETW trace logs can only be processed on Windows", .path.display())]
    Unsupported { path: PathBuf },

    #[error("malformed fragment payload: header declares {declared} fragment bytes but only {available} payload bytes are available")]
    MalformedPayload { declared: u32, available: usize },

    #[error("event timestamp {filetime} is not a representable file time")]
    InvalidTimestamp { filetime: i64 },

    #[error("packet timestamp {timestamp} cannot be stored in a pcap record (1970 to 2106 only)")]
    TimestampOutOfRange { timestamp: DateTime<Utc> },

    #[error("cannot {operation} a trace session in the {state} state")]
    InvalidSessionState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("failed to write capture file '{}'", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
