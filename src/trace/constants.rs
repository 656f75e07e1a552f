//! Fixed identifiers and layout constants for NDIS packet capture traces.

use uuid::{uuid, Uuid};

/// Provider GUID of `Microsoft-Windows-NDIS-PacketCapture`.
pub const NDIS_PACKET_CAPTURE_PROVIDER_ID: Uuid = uuid!("2ed6006e-4729-4609-b423-3ee7bcd678ef");

/// Event id of the packet fragment event emitted by the NDIS capture provider.
pub const PACKET_FRAGMENT_EVENT_ID: u16 = 1001;

/// Size in bytes of the header that precedes every packet fragment.
pub const FRAGMENT_HEADER_SIZE: usize = 12;

/// Number of 100ns file-time ticks between 1601-01-01 and 1970-01-01.
pub const FILETIME_UNIX_EPOCH_OFFSET: i64 = 116_444_736_000_000_000;

/// File-time ticks per second.
pub const FILETIME_TICKS_PER_SECOND: i64 = 10_000_000;
