//! Data model for NDIS trace extraction.
//!
//! `RawEventRecord` is what a trace source hands to its sink for the duration of
//! one callback. `PacketRecord` is the owned result of extracting a matching
//! event, and `SessionStatistics` summarizes everything a session has seen.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One raw event as delivered by a trace source.
///
/// The payload is borrowed from the source and is only valid for the callback
/// it was delivered in. Anything that must outlive the callback has to be copied.
///
/// # Fields
/// - `provider_id`: GUID of the provider that emitted the event
/// - `event_id`: Event descriptor id
/// - `timestamp`: Windows file-time (100ns ticks since 1601-01-01 UTC)
/// - `payload`: Event user data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEventRecord<'a> {
    pub provider_id: Uuid,
    pub event_id: u16,
    pub timestamp: i64,
    pub payload: &'a [u8],
}

/// A captured packet fragment extracted from a matching event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketRecord {
    timestamp: DateTime<Utc>,
    fragment: Vec<u8>,
}

impl PacketRecord {
    pub fn new(timestamp: DateTime<Utc>, fragment: Vec<u8>) -> Self {
        Self {
            timestamp,
            fragment,
        }
    }

    /// Capture time of the fragment in UTC.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Raw packet bytes, exactly as declared by the fragment header.
    pub fn fragment(&self) -> &[u8] {
        &self.fragment
    }
}

/// Counters and timestamp bounds accumulated over one trace session.
///
/// # Fields
/// - `total_events_seen`: Every event delivered by the source, matching or not
/// - `matched_events_seen`: Events that produced a `PacketRecord`
/// - `buffers_seen`: Buffer callbacks delivered by the source
/// - `oldest_timestamp`: Earliest matched timestamp, `None` until the first match
/// - `newest_timestamp`: Latest matched timestamp, `None` until the first match
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStatistics {
    pub total_events_seen: u64,
    pub matched_events_seen: u64,
    pub buffers_seen: u64,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
}

impl SessionStatistics {
    /// Widen the timestamp bounds to include `ts`. Ties keep the current bound.
    pub(crate) fn observe(&mut self, ts: DateTime<Utc>) {
        self.matched_events_seen += 1;
        match self.oldest_timestamp {
            Some(oldest) if oldest <= ts => {}
            _ => self.oldest_timestamp = Some(ts),
        }
        match self.newest_timestamp {
            Some(newest) if newest >= ts => {}
            _ => self.newest_timestamp = Some(ts),
        }
    }
}
