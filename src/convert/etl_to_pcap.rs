//! ETL to pcap conversion implementation
//!
//! The whole trace is read into a [`TraceSession`] first. The capture file is
//! only created once the trace has been consumed without error, so a failed
//! read never leaves an output file behind.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::Result;
use crate::pcap::write_pcap_file;
use crate::record::TraceSession;
use crate::source::{EtlTraceSource, TraceSource};
use crate::trace::SessionStatistics;

/// What a conversion did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    #[serde(flatten)]
    pub statistics: SessionStatistics,
    pub packets_written: u64,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S>(elapsed: &Duration, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(elapsed.as_secs_f64())
}

/// Convert an NDIS packet capture ETL file to a pcap file.
///
/// # Arguments
///
/// * `input_path` - Path to the input trace log (.etl)
/// * `output_path` - Path of the capture file to create or overwrite (.pcap)
pub fn convert_etl_to_pcap(input_path: &Path, output_path: &Path) -> Result<ConversionSummary> {
    let mut source = EtlTraceSource::new(input_path);
    convert_trace(&mut source, output_path)
}

/// Read every event of `source` and write the extracted packets to
/// `output_path`, in the order they were delivered.
pub fn convert_trace(
    source: &mut dyn TraceSource,
    output_path: &Path,
) -> Result<ConversionSummary> {
    let started = Instant::now();

    let mut session = TraceSession::new();
    session.open()?;
    source.drive(&mut session)?;
    let (records, statistics) = session.finalize()?;

    tracing::info!(
        total_events_seen = statistics.total_events_seen,
        matched_events_seen = statistics.matched_events_seen,
        "trace read complete"
    );

    write_pcap_file(output_path, &records)?;

    Ok(ConversionSummary {
        statistics,
        packets_written: records.len() as u64,
        elapsed: started.elapsed(),
    })
}
