//! Conversion from Windows file-time to UTC.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::trace::constants::{FILETIME_TICKS_PER_SECOND, FILETIME_UNIX_EPOCH_OFFSET};

/// Convert a file-time (100ns ticks since 1601-01-01 UTC) to a UTC instant.
///
/// Negative file-times are rejected, matching what the tracing subsystem
/// considers a valid timestamp.
pub fn filetime_to_utc(filetime: i64) -> Result<DateTime<Utc>> {
    if filetime < 0 {
        return Err(Error::InvalidTimestamp { filetime });
    }

    let unix_ticks = filetime - FILETIME_UNIX_EPOCH_OFFSET;
    let secs = unix_ticks.div_euclid(FILETIME_TICKS_PER_SECOND);
    let nanos = unix_ticks.rem_euclid(FILETIME_TICKS_PER_SECOND) * 100;

    DateTime::from_timestamp(secs, nanos as u32).ok_or(Error::InvalidTimestamp { filetime })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unix_epoch() {
        let ts = filetime_to_utc(FILETIME_UNIX_EPOCH_OFFSET).unwrap();
        assert_eq!(ts, Utc.timestamp_opt(0, 0).unwrap());
    }

    #[test]
    fn test_sub_second_precision() {
        // 1.5s plus one tick past the epoch.
        let ts = filetime_to_utc(FILETIME_UNIX_EPOCH_OFFSET + 15_000_001).unwrap();
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_nanos(), 500_000_100);
    }

    #[test]
    fn test_known_date() {
        // 2019-01-01T00:00:00Z
        let ts = filetime_to_utc(131_907_744_000_000_000).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_filetime_origin() {
        let ts = filetime_to_utc(0).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_negative_filetime_rejected() {
        assert!(matches!(
            filetime_to_utc(-1),
            Err(Error::InvalidTimestamp { filetime: -1 })
        ));
    }
}
