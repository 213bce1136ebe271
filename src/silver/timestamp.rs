//! Lenient `event_time` coercion
//!
//! Anything that cannot be read as a timestamp coerces to `None` instead of
//! failing, so one corrupt row never aborts a run. Parsed values are
//! truncated to microseconds, the precision the silver layer stores.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound};
use serde_json::Value;

/// Offset-aware layouts besides strict RFC 3339
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

/// Coerce a raw JSON value into a naive timestamp
///
/// Only strings are considered; numbers, booleans, nulls and nested values
/// coerce to `None`.
pub fn coerce_event_time(value: &Value) -> Option<NaiveDateTime> {
    value.as_str().and_then(parse_timestamp)
}

/// Parse a timestamp string, normalizing offset-aware values to naive UTC
///
/// Digits below a microsecond are dropped.
///
/// # Example
/// ```
/// use medallion_etl::silver::parse_timestamp;
///
/// let utc = parse_timestamp("2024-01-01T12:00:00+02:00").unwrap();
/// assert_eq!(utc.to_string(), "2024-01-01 10:00:00");
/// assert!(parse_timestamp("bad-date").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_any(raw.trim()).map(|dt| dt.trunc_subsecs(6))
}

fn parse_any(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
