use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::pcap::{unix_timeval, FileHeader, RecordHeader};
use crate::trace::PacketRecord;

/// Writes a capture file to any byte sink.
///
/// The global header is written on construction. If a write fails, the sink
/// holds a partial record and no further writes should be attempted.
pub struct PcapWriter<W: Write> {
    sink: W,
    packets_written: u64,
}

impl<W: Write> PcapWriter<W> {
    pub fn new(mut sink: W) -> io::Result<Self> {
        sink.write_all(&FileHeader::ethernet().to_bytes())?;
        Ok(Self {
            sink,
            packets_written: 0,
        })
    }

    /// Append one record header and the packet bytes, unmodified.
    pub fn write_packet(&mut self, packet: &PacketRecord) -> io::Result<()> {
        let header = RecordHeader::for_packet(packet)?;
        self.sink.write_all(&header.to_bytes())?;
        self.sink.write_all(packet.fragment())?;
        self.packets_written += 1;
        Ok(())
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Write a complete capture file containing `records`, in the order given.
pub fn write_pcap<W: Write>(sink: W, records: &[PacketRecord]) -> io::Result<W> {
    let mut writer = PcapWriter::new(sink)?;
    for record in records {
        writer.write_packet(record)?;
    }
    writer.finish()
}

/// Create (or truncate) `path` and write `records` to it.
///
/// Every timestamp is checked before the file is touched, so a record that
/// cannot be encoded leaves no file behind. An I/O failure part way through
/// leaves the partially written file in place.
pub fn write_pcap_file(path: &Path, records: &[PacketRecord]) -> Result<()> {
    for record in records {
        unix_timeval(record.timestamp())?;
    }

    let output_error = |source: io::Error| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    write_pcap(BufWriter::new(file), records).map_err(output_error)?;

    tracing::debug!(path = %path.display(), packets = records.len(), "wrote capture file");
    Ok(())
}
