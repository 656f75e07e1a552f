//! Trace format conversion utilities
//!
//! This module converts NDIS packet capture trace logs into pcap capture files.

mod etl_to_pcap;

pub use etl_to_pcap::{convert_etl_to_pcap, convert_trace, ConversionSummary};
