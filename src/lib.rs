//! etl2pcap library - NDIS packet capture traces to pcap files.
//!
//! Windows can capture packets with the `Microsoft-Windows-NDIS-PacketCapture`
//! provider (`netsh trace start capture=yes`), which records them into an ETL
//! trace log. This library extracts the packet fragment events from such a log
//! and writes them out as a classic pcap file that Wireshark and tcpdump read.
//!
//! # Modules
//!
//! - [`trace`] - Event filtering and packet fragment decoding
//! - [`record`] - Per-trace session state and statistics
//! - [`source`] - Trace sources (ETW on Windows, in-memory replay)
//! - [`pcap`] - Capture file writer
//! - [`convert`] - End to end conversion
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let summary = etl2pcap::convert_etl_to_pcap(
//!     Path::new("capture.etl"),
//!     Path::new("capture.pcap"),
//! ).expect("conversion failed");
//! println!("{} packets", summary.packets_written);
//! ```

pub mod convert;
pub mod error;
pub mod pcap;
pub mod record;
pub mod source;
pub mod trace;

// Re-export for convenience
pub use convert::{convert_etl_to_pcap, convert_trace, ConversionSummary};
pub use error::{Error, Result, TraceOpenKind};
pub use record::{SessionState, TraceSession};
pub use source::{EtlTraceSource, RecordedEvent, RecordedTrace, TraceSink, TraceSource};
pub use trace::{PacketRecord, RawEventRecord, SessionStatistics};
