//! Accumulator for the packets and statistics of one trace log.
//!
//! A `TraceSession` is fed raw events one at a time, in delivery order, and is
//! finalized exactly once after the trace source reports end of input.

use std::fmt;
use std::mem;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::source::TraceSink;
use crate::trace::{NdisFragmentExtractor, PacketRecord, RawEventRecord, SessionStatistics};

/// Lifecycle of a [`TraceSession`].
///
/// `Idle -> Accumulating -> Finalized`, nothing leaves `Finalized`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Accumulating,
    Finalized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Accumulating => write!(f, "accumulating"),
            SessionState::Finalized => write!(f, "finalized"),
        }
    }
}

#[derive(Debug)]
pub struct TraceSession {
    state: SessionState,
    extractor: NdisFragmentExtractor,
    records: Vec<PacketRecord>,
    stats: SessionStatistics,
}

impl Default for TraceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            extractor: NdisFragmentExtractor::new(),
            records: Vec::new(),
            stats: SessionStatistics::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Explicitly start accumulating. Opening an already open session is a no-op.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle => {
                tracing::debug!("trace session opened");
                self.state = SessionState::Accumulating;
                Ok(())
            }
            SessionState::Accumulating => Ok(()),
            SessionState::Finalized => Err(Error::InvalidSessionState {
                operation: "open",
                state: self.state,
            }),
        }
    }

    /// Feed one raw event to the session.
    ///
    /// Matching events are appended in arrival order and widen the timestamp
    /// bounds. Errors from the extractor abort the session's caller; the
    /// session itself stays usable so the counters can still be inspected.
    pub fn ingest(&mut self, record: &RawEventRecord<'_>) -> Result<()> {
        if self.state == SessionState::Finalized {
            return Err(Error::InvalidSessionState {
                operation: "ingest into",
                state: self.state,
            });
        }
        self.open()?;

        let packet = self.extractor.process(record);
        self.stats.total_events_seen = self.extractor.total_events_seen();

        if let Some(packet) = packet? {
            self.stats.observe(packet.timestamp());
            self.records.push(packet);
        }
        Ok(())
    }

    /// Count one buffer delivered by the trace source.
    pub fn record_buffer(&mut self) {
        self.stats.buffers_seen += 1;
        tracing::debug!(
            buffers_seen = self.stats.buffers_seen,
            total_events_seen = self.stats.total_events_seen,
            "trace buffer processed"
        );
    }

    /// Snapshot of the statistics gathered so far.
    pub fn statistics(&self) -> SessionStatistics {
        self.stats.clone()
    }

    /// Packets accumulated so far, in arrival order.
    pub fn records(&self) -> &[PacketRecord] {
        &self.records
    }

    pub fn oldest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.stats.oldest_timestamp
    }

    pub fn newest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.stats.newest_timestamp
    }

    /// Freeze the session and hand over its packets and statistics.
    ///
    /// May only be called once.
    pub fn finalize(&mut self) -> Result<(Vec<PacketRecord>, SessionStatistics)> {
        if self.state == SessionState::Finalized {
            return Err(Error::InvalidSessionState {
                operation: "finalize",
                state: self.state,
            });
        }
        self.state = SessionState::Finalized;

        tracing::debug!(
            total_events_seen = self.stats.total_events_seen,
            matched_events_seen = self.stats.matched_events_seen,
            "trace session finalized"
        );

        Ok((mem::take(&mut self.records), self.stats.clone()))
    }
}

impl TraceSink for TraceSession {
    fn on_event(&mut self, record: &RawEventRecord<'_>) -> Result<()> {
        self.ingest(record)
    }

    fn on_buffer(&mut self) -> bool {
        self.record_buffer();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{
        FILETIME_TICKS_PER_SECOND, FILETIME_UNIX_EPOCH_OFFSET, NDIS_PACKET_CAPTURE_PROVIDER_ID,
        PACKET_FRAGMENT_EVENT_ID,
    };
    use proptest::prelude::*;
    use uuid::Uuid;

    fn fragment_payload(data: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; 8];
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(data);
        buf
    }

    fn ndis_event(secs: i64, payload: &[u8]) -> RawEventRecord<'_> {
        RawEventRecord {
            provider_id: NDIS_PACKET_CAPTURE_PROVIDER_ID,
            event_id: PACKET_FRAGMENT_EVENT_ID,
            timestamp: FILETIME_UNIX_EPOCH_OFFSET + secs * FILETIME_TICKS_PER_SECOND,
            payload,
        }
    }

    fn other_event(payload: &[u8]) -> RawEventRecord<'_> {
        RawEventRecord {
            provider_id: Uuid::from_u128(1),
            event_id: 1,
            timestamp: 0,
            payload,
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = TraceSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.statistics(), SessionStatistics::default());
    }

    #[test]
    fn test_first_ingest_starts_accumulating() {
        let mut session = TraceSession::new();
        session.ingest(&other_event(&[])).unwrap();
        assert_eq!(session.state(), SessionState::Accumulating);
    }

    #[test]
    fn test_explicit_open() {
        let mut session = TraceSession::new();
        session.open().unwrap();
        session.open().unwrap();
        assert_eq!(session.state(), SessionState::Accumulating);
    }

    #[test]
    fn test_ingest_counts_and_keeps_order() {
        let a = fragment_payload(&[1]);
        let b = fragment_payload(&[2]);
        let c = fragment_payload(&[3]);

        let mut session = TraceSession::new();
        session.ingest(&ndis_event(30, &a)).unwrap();
        session.ingest(&other_event(&[])).unwrap();
        session.ingest(&ndis_event(10, &b)).unwrap();
        session.ingest(&ndis_event(20, &c)).unwrap();

        let (records, stats) = session.finalize().unwrap();
        let fragments: Vec<&[u8]> = records.iter().map(|r| r.fragment()).collect();
        assert_eq!(fragments, vec![&[1u8][..], &[2u8][..], &[3u8][..]]);

        assert_eq!(stats.total_events_seen, 4);
        assert_eq!(stats.matched_events_seen, 3);
        assert_eq!(stats.oldest_timestamp.unwrap().timestamp(), 10);
        assert_eq!(stats.newest_timestamp.unwrap().timestamp(), 30);
    }

    #[test]
    fn test_no_matches_leave_bounds_empty() {
        let mut session = TraceSession::new();
        session.ingest(&other_event(&[])).unwrap();
        let (records, stats) = session.finalize().unwrap();
        assert!(records.is_empty());
        assert_eq!(stats.total_events_seen, 1);
        assert_eq!(stats.matched_events_seen, 0);
        assert!(stats.oldest_timestamp.is_none());
        assert!(stats.newest_timestamp.is_none());
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut session = TraceSession::new();
        session.finalize().unwrap();
        assert!(matches!(
            session.finalize(),
            Err(Error::InvalidSessionState {
                operation: "finalize",
                state: SessionState::Finalized
            })
        ));
    }

    #[test]
    fn test_ingest_after_finalize_fails() {
        let payload = fragment_payload(&[1]);
        let mut session = TraceSession::new();
        session.ingest(&ndis_event(1, &payload)).unwrap();
        session.finalize().unwrap();

        assert!(matches!(
            session.ingest(&ndis_event(2, &payload)),
            Err(Error::InvalidSessionState { .. })
        ));
        assert!(matches!(
            session.open(),
            Err(Error::InvalidSessionState { .. })
        ));
        assert_eq!(session.statistics().total_events_seen, 1);
    }

    #[test]
    fn test_malformed_event_propagates() {
        let mut payload = fragment_payload(&[1, 2, 3]);
        payload.pop();

        let mut session = TraceSession::new();
        let err = session.ingest(&ndis_event(1, &payload)).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
        assert_eq!(session.statistics().total_events_seen, 1);
        assert_eq!(session.statistics().matched_events_seen, 0);
        assert!(session.records().is_empty());
    }

    #[test]
    fn test_sink_counts_buffers() {
        let mut session = TraceSession::new();
        assert!(session.on_buffer());
        assert!(session.on_buffer());
        assert_eq!(session.statistics().buffers_seen, 2);
    }

    proptest! {
        #[test]
        fn prop_bounds_match_true_extremes(secs in proptest::collection::vec(0i64..4_000_000_000, 1..64)) {
            let payload = fragment_payload(&[0xee]);
            let mut session = TraceSession::new();
            for s in &secs {
                session.ingest(&ndis_event(*s, &payload)).unwrap();
            }

            let oldest = session.oldest_timestamp().unwrap();
            let newest = session.newest_timestamp().unwrap();
            prop_assert!(oldest <= newest);
            prop_assert_eq!(oldest.timestamp(), *secs.iter().min().unwrap());
            prop_assert_eq!(newest.timestamp(), *secs.iter().max().unwrap());
            prop_assert_eq!(session.statistics().matched_events_seen, secs.len() as u64);
        }
    }
}
