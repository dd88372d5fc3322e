//! High-resolution wall clock.
//!
//! Frame timestamps are expressed in seconds since 1601-01-01 UTC, the
//! FILETIME epoch, so logs recorded on different platforms line up with the
//! analysis scripts that consume them.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds between 1601-01-01 and 1970-01-01 (UTC).
pub const FILETIME_UNIX_OFFSET_SECS: f64 = 11_644_473_600.0;

/// Current time in seconds since the FILETIME epoch.
pub fn precise_time() -> f64 {
    unix_time() + FILETIME_UNIX_OFFSET_SECS
}

/// Current time in seconds since the Unix epoch.
///
/// `SystemTime` reads `CLOCK_REALTIME` on unix and
/// `GetSystemTimePreciseAsFileTime` on Windows.
pub fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precise_time_uses_filetime_epoch() {
        let unix = unix_time();
        let precise = precise_time();
        let diff = precise - unix - FILETIME_UNIX_OFFSET_SECS;
        assert!(diff.abs() < 1.0, "clocks disagree by {diff}s");
    }

    #[test]
    fn test_precise_time_is_monotonic_enough() {
        let a = precise_time();
        let b = precise_time();
        assert!(b >= a - 1e-3);
    }
}
