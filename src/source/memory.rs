//! In-memory trace source.
//!
//! `RecordedTrace` holds owned copies of events and replays them into a sink
//! exactly like a trace log would be: events in order, grouped into buffers,
//! with a buffer callback after each group.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::source::{TraceSink, TraceSource};
use crate::trace::RawEventRecord;

const DEFAULT_EVENTS_PER_BUFFER: usize = 64;

/// An owned trace event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedEvent {
    pub provider_id: Uuid,
    pub event_id: u16,
    pub timestamp: i64,
    pub payload: Vec<u8>,
}

impl RecordedEvent {
    pub fn new(provider_id: Uuid, event_id: u16, timestamp: i64, payload: Vec<u8>) -> Self {
        Self {
            provider_id,
            event_id,
            timestamp,
            payload,
        }
    }

    pub fn as_raw(&self) -> RawEventRecord<'_> {
        RawEventRecord {
            provider_id: self.provider_id,
            event_id: self.event_id,
            timestamp: self.timestamp,
            payload: &self.payload,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordedTrace {
    name: PathBuf,
    events: Vec<RecordedEvent>,
    events_per_buffer: usize,
    failure_status: Option<u32>,
}

impl RecordedTrace {
    pub fn new(events: Vec<RecordedEvent>) -> Self {
        Self {
            name: PathBuf::from("<memory>"),
            events,
            events_per_buffer: DEFAULT_EVENTS_PER_BUFFER,
            failure_status: None,
        }
    }

    /// Name reported in errors in place of a file path.
    pub fn with_name(mut self, name: impl AsRef<Path>) -> Self {
        self.name = name.as_ref().to_path_buf();
        self
    }

    /// Number of events delivered between buffer callbacks (at least 1).
    pub fn with_events_per_buffer(mut self, events_per_buffer: usize) -> Self {
        self.events_per_buffer = events_per_buffer.max(1);
        self
    }

    /// Make `drive` report a processing failure with `status` after the last
    /// event has been delivered.
    pub fn fail_with_status(mut self, status: u32) -> Self {
        self.failure_status = Some(status);
        self
    }
}

impl TraceSource for RecordedTrace {
    fn drive(&mut self, sink: &mut dyn TraceSink) -> Result<()> {
        for buffer in self.events.chunks(self.events_per_buffer) {
            for event in buffer {
                sink.on_event(&event.as_raw())?;
            }
            if !sink.on_buffer() {
                tracing::warn!(trace = %self.name.display(), "sink stopped trace processing early");
                return Ok(());
            }
        }

        match self.failure_status {
            Some(code) => Err(Error::TraceProcessing {
                path: self.name.clone(),
                code,
            }),
            None => Ok(()),
        }
    }
}
