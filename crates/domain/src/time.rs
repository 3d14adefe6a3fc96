//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDate, Utc};

/// UTC timestamp used for `measureDateTime` and date-time query literals.
pub type Timestamp = DateTime<Utc>;

/// Parse an RFC 3339 date-time, or a bare `YYYY-MM-DD` date as midnight UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.to_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
