// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and epoch-millisecond timestamps.
//!
//! Check-ins carry epoch milliseconds on the wire; everything user-facing
//! is RFC3339.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert epoch milliseconds to a UTC datetime.
///
/// Out-of-range values (far outside the representable chrono range) fall
/// back to the epoch rather than panicking.
pub fn datetime_from_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_round_trip() {
        let dt = datetime_from_ms(1_700_000_000_000);
        let formatted = format_utc_rfc3339(dt);
        assert!(formatted.ends_with('Z'));
        let parsed = chrono::DateTime::parse_from_rfc3339(&formatted).unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_out_of_range_ms_falls_back_to_epoch() {
        assert_eq!(datetime_from_ms(i64::MAX), DateTime::UNIX_EPOCH);
    }
}
