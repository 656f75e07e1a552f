//! Filter and extractor for NDIS packet fragment events.

use crate::error::Result;
use crate::trace::constants::{NDIS_PACKET_CAPTURE_PROVIDER_ID, PACKET_FRAGMENT_EVENT_ID};
use crate::trace::filetime::filetime_to_utc;
use crate::trace::fragment;
use crate::trace::models::{PacketRecord, RawEventRecord};

/// Returns true if `record` is an NDIS packet fragment event.
pub fn is_packet_fragment(record: &RawEventRecord<'_>) -> bool {
    record.provider_id == NDIS_PACKET_CAPTURE_PROVIDER_ID
        && record.event_id == PACKET_FRAGMENT_EVENT_ID
}

/// Turns raw events into `PacketRecord`s, counting every event it is handed.
#[derive(Debug, Default)]
pub struct NdisFragmentExtractor {
    total_events_seen: u64,
}

impl NdisFragmentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events passed to [`Self::process`], matching or not.
    pub fn total_events_seen(&self) -> u64 {
        self.total_events_seen
    }

    /// Extract a packet from `record`.
    ///
    /// Returns `Ok(None)` for events from other providers or with other ids. A
    /// matching event with a malformed payload or timestamp is an error rather
    /// than being skipped, so the statistics never silently undercount.
    pub fn process(&mut self, record: &RawEventRecord<'_>) -> Result<Option<PacketRecord>> {
        self.total_events_seen += 1;

        if !is_packet_fragment(record) {
            return Ok(None);
        }

        let timestamp = filetime_to_utc(record.timestamp)?;
        let decoded = fragment::decode(record.payload)?;

        tracing::trace!(
            miniport_if_index = decoded.header.miniport_if_index,
            lower_if_index = decoded.header.lower_if_index,
            fragment_size = decoded.header.fragment_size,
            "extracted packet fragment"
        );

        Ok(Some(PacketRecord::new(timestamp, decoded.fragment.to_vec())))
    }
}
