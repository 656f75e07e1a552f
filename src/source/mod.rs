//! Trace source abstraction.
//!
//! A trace source owns the mechanics of reading a trace log and pushes every
//! event it finds to a [`TraceSink`], one at a time and in delivery order, from
//! inside a single blocking [`TraceSource::drive`] call.
//!
//! # Design
//!
//! The sink is borrowed for the duration of `drive` only, so nothing needs to
//! keep the callback alive past the call. Event payloads are likewise borrowed
//! for one `on_event` call; sinks copy out what they keep.
//!
//! - [`EtlTraceSource`]: reads `.etl` files through the Windows tracing API
//! - [`RecordedTrace`]: replays an in-memory list of events

mod etw;
mod memory;

pub use etw::EtlTraceSource;
pub use memory::{RecordedEvent, RecordedTrace};

use crate::error::Result;
use crate::trace::RawEventRecord;

/// Receiver for the events of a trace source.
pub trait TraceSink {
    /// Handle one event. Returning an error stops the drive and the error is
    /// returned from [`TraceSource::drive`].
    fn on_event(&mut self, record: &RawEventRecord<'_>) -> Result<()>;

    /// Called once per internal buffer of the source. Returning `false` asks
    /// the source to stop early.
    fn on_buffer(&mut self) -> bool {
        true
    }
}

/// A finite, already recorded trace that can be replayed into a sink.
pub trait TraceSource {
    /// Deliver every event to `sink`, blocking until the input is exhausted
    /// or an error occurs.
    fn drive(&mut self, sink: &mut dyn TraceSink) -> Result<()>;
}
