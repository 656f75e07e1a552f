//! Common test utilities for etl2pcap integration tests.

use etl2pcap::trace::{
    FILETIME_TICKS_PER_SECOND, FILETIME_UNIX_EPOCH_OFFSET, NDIS_PACKET_CAPTURE_PROVIDER_ID,
    PACKET_FRAGMENT_EVENT_ID,
};
use etl2pcap::RecordedEvent;
use uuid::Uuid;

/// Build a fragment event payload: 12 byte header followed by `data`.
pub fn fragment_payload(declared: u32, data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12 + data.len());
    buf.extend_from_slice(&4u32.to_le_bytes());
    buf.extend_from_slice(&5u32.to_le_bytes());
    buf.extend_from_slice(&declared.to_le_bytes());
    buf.extend_from_slice(data);
    buf
}

/// An NDIS packet fragment event at `micros` microseconds past the Unix epoch.
pub fn ndis_event(micros: i64, data: &[u8]) -> RecordedEvent {
    RecordedEvent::new(
        NDIS_PACKET_CAPTURE_PROVIDER_ID,
        PACKET_FRAGMENT_EVENT_ID,
        FILETIME_UNIX_EPOCH_OFFSET + micros * (FILETIME_TICKS_PER_SECOND / 1_000_000),
        fragment_payload(data.len() as u32, data),
    )
}

/// An event from some unrelated provider.
pub fn noise_event(event_id: u16) -> RecordedEvent {
    RecordedEvent::new(
        Uuid::from_u128(0x9e81_4aad_3204_11d2_9a82_0060_0830_8a80),
        event_id,
        FILETIME_UNIX_EPOCH_OFFSET,
        vec![0xff; 3],
    )
}

/// A parsed pcap record: (ts_sec, ts_usec, captured_len, original_len, data).
pub type PcapRecord = (i32, i32, u32, u32, Vec<u8>);

/// Minimal reader for the capture files the crate writes, used to check
/// the output independently of the writer.
pub fn read_pcap(bytes: &[u8]) -> (Vec<u8>, Vec<PcapRecord>) {
    let header = bytes[..24].to_vec();
    let u32_at = |off: usize| u32::from_ne_bytes(bytes[off..off + 4].try_into().unwrap());

    let mut records = Vec::new();
    let mut off = 24;
    while off < bytes.len() {
        let sec = u32_at(off) as i32;
        let usec = u32_at(off + 4) as i32;
        let cap = u32_at(off + 8);
        let orig = u32_at(off + 12);
        let start = off + 16;
        let end = start + cap as usize;
        records.push((sec, usec, cap, orig, bytes[start..end].to_vec()));
        off = end;
    }
    assert_eq!(off, bytes.len(), "trailing bytes after last record");
    (header, records)
}
