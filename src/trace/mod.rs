//! NDIS trace event decoding.
//!
//! This module turns raw trace events into owned packet records.
//!
//! # Module Organization
//!
//! - [`constants`]: Provider GUID, event id and layout constants
//! - [`models`]: Raw event, packet and statistics types
//! - [`fragment`]: Packet fragment header decoder
//! - [`filetime`]: Windows file-time to UTC conversion
//! - [`extract`]: Event filter and packet extractor

pub mod constants;
pub mod extract;
pub mod filetime;
pub mod fragment;
pub mod models;

// Re-export commonly used types
pub use constants::*;
pub use extract::NdisFragmentExtractor;
pub use models::*;
