//! Timestamp handling for upstream departure records.
//!
//! Upstream APIs send either an ISO-8601 timestamp (with or without an
//! offset) or a separate date and time of day. Values without an offset are
//! local to the stop and are resolved in the configured zone.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Error returned when a timestamp cannot be resolved to an instant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse an ISO-8601 timestamp into a UTC instant.
///
/// Accepts RFC 3339 (`2024-03-15T10:23:00+01:00`, `...Z`) and naive local
/// date-times (`2024-03-15T10:23:00`, optionally with fractional seconds or
/// without seconds). Naive values are interpreted in `zone`.
///
/// # Examples
///
/// ```
/// use departure_board::domain::parse_instant;
///
/// let zone = chrono_tz::Europe::Stockholm;
/// let a = parse_instant("2024-03-15T10:23:00", zone).unwrap();
/// let b = parse_instant("2024-03-15T09:23:00Z", zone).unwrap();
/// assert_eq!(a, b);
///
/// assert!(parse_instant("10:23", zone).is_err());
/// assert!(parse_instant("", zone).is_err());
/// ```
pub fn parse_instant(s: &str, zone: Tz) -> Result<DateTime<Utc>, TimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeError::new("empty timestamp"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| TimeError::new("expected ISO-8601 date and time"))?;

    localize(naive, zone)
}

/// Combine a separate date (`YYYY-MM-DD`) and time of day (`HH:MM:SS` or
/// `HH:MM`) into a UTC instant, interpreting them in `zone`.
///
/// # Examples
///
/// ```
/// use departure_board::domain::parse_date_time;
///
/// let zone = chrono_tz::Europe::Stockholm;
/// let t = parse_date_time("2024-03-15", "10:23:00", zone).unwrap();
/// assert_eq!(t.to_rfc3339(), "2024-03-15T09:23:00+00:00");
///
/// assert!(parse_date_time("2024-03-15", "25:00", zone).is_err());
/// ```
pub fn parse_date_time(date: &str, time: &str, zone: Tz) -> Result<DateTime<Utc>, TimeError> {
    let combined = format!("{} {}", date.trim(), time.trim());

    let naive = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M"))
        .map_err(|_| TimeError::new("expected YYYY-MM-DD and HH:MM[:SS]"))?;

    localize(naive, zone)
}

/// Resolve a local wall-clock time in `zone`.
///
/// Ambiguous times (the repeated hour when clocks go back) resolve to the
/// earlier instant. Times inside a DST gap do not exist and are rejected.
fn localize(naive: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>, TimeError> {
    naive
        .and_local_timezone(zone)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeError::new("local time does not exist in zone"))
}
