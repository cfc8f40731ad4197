//! Timestamp utilities
//!
//! Timestamps are persisted as fixed-width RFC 3339 UTC text
//! (`2025-03-14T09:26:53.589793Z`) so that `ORDER BY` on the text column is
//! chronological.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp, truncated to the stored precision
pub fn now() -> DateTime<Utc> {
    truncate_to_storage(Utc::now())
}

/// Drop sub-microsecond precision so a value survives a database round trip
pub fn truncate_to_storage(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.timestamp_subsec_nanos();
    ts - chrono::Duration::nanoseconds(i64::from(nanos % 1_000))
}

/// Format a timestamp for storage
pub fn to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn from_db(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // After 2000-01-01 and before 2100-01-01
        assert!(timestamp.timestamp() > 946_684_800);
        assert!(timestamp.timestamp() < 4_102_444_800);
    }

    #[test]
    fn test_db_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let fractional = whole + chrono::Duration::microseconds(589_793);

        assert_eq!(to_db(&whole), "2025-03-14T09:26:53.000000Z");
        assert_eq!(to_db(&fractional), "2025-03-14T09:26:53.589793Z");
        assert_eq!(to_db(&whole).len(), to_db(&fractional).len());
    }

    #[test]
    fn test_db_round_trip() {
        let ts = now();
        let parsed = from_db("createdAt", &to_db(&ts)).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_truncate_drops_nanoseconds() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        let truncated = truncate_to_storage(ts);
        assert_eq!(truncated.timestamp_subsec_nanos(), 1_234_000);
    }

    #[test]
    fn test_from_db_rejects_garbage() {
        let err = from_db("dateTime", "yesterday").unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert!(err.to_string().contains("dateTime"));
    }
}
