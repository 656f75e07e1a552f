//! Classic libpcap capture file output.
//!
//! A capture file is a 24 byte global header followed by one 16 byte record
//! header plus raw packet bytes per packet. There is no index and no trailer.
//! Fields are written in the byte order of the host; readers tell the order
//! apart from the magic number.
//!
//! Useful resources:
//! * https://wiki.wireshark.org/Development/LibpcapFileFormat
//! * https://www.tcpdump.org/linktypes.html

mod writer;

pub use writer::{write_pcap, write_pcap_file, PcapWriter};

use std::io;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::trace::PacketRecord;

pub const TCPDUMP_MAGIC: u32 = 0xa1b2_c3d4;
pub const PCAP_VERSION_MAJOR: u16 = 2;
pub const PCAP_VERSION_MINOR: u16 = 4;
/// Snapshot length used by current tcpdump and Wireshark (2^18).
pub const PCAP_SNAPLEN: u32 = 262_144;
pub const LINKTYPE_ETHERNET: u32 = 1;

pub const FILE_HEADER_SIZE: usize = 24;
pub const RECORD_HEADER_SIZE: usize = 16;

/// The `pcap_file_header` structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version_major: u16,
    pub version_minor: u16,
    pub this_zone: i32,
    pub sigfigs: u32,
    pub snap_len: u32,
    pub link_type: u32,
}

impl FileHeader {
    /// Header for an Ethernet capture with UTC timestamps.
    pub fn ethernet() -> Self {
        Self {
            magic: TCPDUMP_MAGIC,
            version_major: PCAP_VERSION_MAJOR,
            version_minor: PCAP_VERSION_MINOR,
            this_zone: 0,
            sigfigs: 0,
            snap_len: PCAP_SNAPLEN,
            link_type: LINKTYPE_ETHERNET,
        }
    }

    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_ne_bytes());
        buf[4..6].copy_from_slice(&self.version_major.to_ne_bytes());
        buf[6..8].copy_from_slice(&self.version_minor.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.this_zone.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.sigfigs.to_ne_bytes());
        buf[16..20].copy_from_slice(&self.snap_len.to_ne_bytes());
        buf[20..24].copy_from_slice(&self.link_type.to_ne_bytes());
        buf
    }
}

/// The per-packet `sf_pkthdr` structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub ts_sec: i32,
    pub ts_usec: i32,
    pub captured_len: u32,
    pub original_len: u32,
}

impl RecordHeader {
    /// Header for `packet`. Fragments are never truncated, so the captured and
    /// original lengths are both the fragment length.
    pub fn for_packet(packet: &PacketRecord) -> io::Result<Self> {
        let (ts_sec, ts_usec) = unix_timeval(packet.timestamp())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let len = u32::try_from(packet.fragment().len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} byte fragment is too large for a pcap record", packet.fragment().len()),
            )
        })?;

        Ok(Self {
            ts_sec,
            ts_usec,
            captured_len: len,
            original_len: len,
        })
    }

    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut buf = [0u8; RECORD_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.ts_sec.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.ts_usec.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.captured_len.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.original_len.to_ne_bytes());
        buf
    }
}

/// Split `ts` into whole seconds and microseconds since the Unix epoch.
///
/// Sub-microsecond precision is truncated. `ts_sec` is read back as an
/// unsigned 32 bit value, so instants from 1970 up to early 2106 are stored
/// with their bit pattern in the signed field. Anything outside that range
/// fails with [`Error::TimestampOutOfRange`].
pub fn unix_timeval(ts: DateTime<Utc>) -> Result<(i32, i32)> {
    let secs = u32::try_from(ts.timestamp())
        .map_err(|_| Error::TimestampOutOfRange { timestamp: ts })?;
    // Leap second representations carry nanos >= 1e9; clamp into the second.
    let usecs = ts.timestamp_subsec_micros().min(999_999) as i32;
    Ok((secs as i32, usecs))
}
