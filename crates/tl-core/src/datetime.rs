//! Timestamp formatting and parsing shared across the workspace.
//!
//! Timestamps are stored and displayed as ISO 8601 text in UTC (e.g.
//! `2026-01-05T08:00:00Z`). Lexicographic ordering of that format matches
//! chronological ordering, which the storage layer relies on for its range
//! queries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::types::ValidationError;

/// Formats a timestamp the way it is stored: RFC 3339 with second precision.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a user-supplied timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, and a bare `YYYY-MM-DD`
/// (midnight). The non-RFC forms are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(parsed.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ValidationError::InvalidTimestamp {
        value: value.to_string(),
    })
}
