//! Session state for one trace log read.
//!
//! This module owns the packets extracted from a trace and the statistics
//! gathered while reading it.

pub mod session;

pub use session::{SessionState, TraceSession};
