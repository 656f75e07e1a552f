//! Decoder for the NDIS packet fragment header.
//!
//! Every packet fragment event carries a fixed 12 byte header followed by the
//! captured bytes:
//!
//! ```text
//! +------------------+----------------+---------------+------------------------+
//! | miniport_if_index| lower_if_index | fragment_size | fragment_size bytes... |
//! |       u32        |      u32       |      u32      |                        |
//! +------------------+----------------+---------------+------------------------+
//! ```
//!
//! All header fields are little-endian, as written by Windows.

use plain::Plain;

use crate::error::{Error, Result};
use crate::trace::constants::FRAGMENT_HEADER_SIZE;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FragmentHeader {
    pub miniport_if_index: u32,
    pub lower_if_index: u32,
    pub fragment_size: u32,
}

unsafe impl Plain for FragmentHeader {}

impl FragmentHeader {
    fn to_native(self) -> Self {
        Self {
            miniport_if_index: u32::from_le(self.miniport_if_index),
            lower_if_index: u32::from_le(self.lower_if_index),
            fragment_size: u32::from_le(self.fragment_size),
        }
    }
}

/// A decoded payload: the header plus a view of the fragment bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedFragment<'a> {
    pub header: FragmentHeader,
    pub fragment: &'a [u8],
}

/// Split an event payload into its fragment header and packet bytes.
///
/// Bytes past the declared fragment size are ignored. Fails with
/// [`Error::MalformedPayload`] when the payload is shorter than the header plus
/// the declared fragment size.
pub fn decode(payload: &[u8]) -> Result<DecodedFragment<'_>> {
    let mut header = FragmentHeader::default();
    if plain::copy_from_bytes(&mut header, payload).is_err() {
        return Err(Error::MalformedPayload {
            declared: 0,
            available: payload.len(),
        });
    }
    let header = header.to_native();

    let end = (header.fragment_size as usize)
        .checked_add(FRAGMENT_HEADER_SIZE)
        .filter(|end| *end <= payload.len())
        .ok_or(Error::MalformedPayload {
            declared: header.fragment_size,
            available: payload.len(),
        })?;

    Ok(DecodedFragment {
        header,
        fragment: &payload[FRAGMENT_HEADER_SIZE..end],
    })
}
