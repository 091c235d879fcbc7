use chrono::DateTime;

use crate::error::{Error, Result};

/// Parse an ISO-8601 timestamp string (as emitted by the event log) into
/// milliseconds since the Unix epoch.
pub fn parse_iso8601_millis(ts: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| Error::InvalidTimestamp(ts.to_string()))
}

/// Format milliseconds since the Unix epoch back to an RFC3339 string (UTC).
pub fn format_millis_rfc3339(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rfc3339() {
        let ts = "2026-02-13T12:00:00.000Z";
        let millis = parse_iso8601_millis(ts).unwrap();
        assert_eq!(millis, 1_770_984_000_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_iso8601_millis("not-a-date").is_err());
    }
}
