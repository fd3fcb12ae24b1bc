//! Departure records, before and after selection.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::time::{parse_date_time, parse_instant};

/// A departure exactly as an upstream source described it.
///
/// Sources disagree on shape, so each supported shape gets a variant. No
/// field is trusted: everything is optional and selection decides what to
/// keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDeparture {
    /// A "site departures" record with single ISO-8601 timestamps.
    Site(SiteDeparture),
    /// A timetable record with split date and time-of-day fields.
    Timetable(TimetableDeparture),
}

/// Site-departures shape: one timestamp per expected/scheduled time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteDeparture {
    pub destination: Option<String>,
    pub line: Option<String>,
    /// Stop point designation, e.g. `"A"` or `"B"`.
    pub platform: Option<String>,
    /// Realtime prediction (ISO-8601).
    pub expected: Option<String>,
    /// Timetabled time (ISO-8601).
    pub scheduled: Option<String>,
    pub journey_id: Option<String>,
    /// Human-formatted countdown supplied by the source, e.g. `"5 min"`.
    pub display: Option<String>,
}

/// Timetable shape: scheduled and realtime times split into date + time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableDeparture {
    /// Direction of travel; plays the role of the destination.
    pub direction: Option<String>,
    pub line_number: Option<String>,
    pub track: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub rt_date: Option<String>,
    pub rt_time: Option<String>,
    /// Product name, used when no line number is given.
    pub product_name: Option<String>,
}

/// Treat blank strings the same as missing ones.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl RawDeparture {
    /// Destination (or direction) text.
    pub fn destination(&self) -> Option<&str> {
        match self {
            RawDeparture::Site(d) => d.destination.as_deref(),
            RawDeparture::Timetable(d) => d.direction.as_deref(),
        }
    }

    /// Platform, stop point or track designation.
    pub fn platform(&self) -> Option<&str> {
        match self {
            RawDeparture::Site(d) => d.platform.as_deref(),
            RawDeparture::Timetable(d) => d.track.as_deref(),
        }
    }

    /// Line designation, falling back to the product name for timetables.
    pub fn line(&self) -> Option<&str> {
        match self {
            RawDeparture::Site(d) => present(&d.line),
            RawDeparture::Timetable(d) => present(&d.line_number).or(present(&d.product_name)),
        }
    }

    /// Whether this kind of record is keyed by an upstream journey.
    ///
    /// Timetable boards never carry journey ids.
    pub fn carries_journey_id(&self) -> bool {
        matches!(self, RawDeparture::Site(_))
    }

    /// Upstream journey identifier, if the source provides one.
    pub fn journey_id(&self) -> Option<&str> {
        match self {
            RawDeparture::Site(d) => present(&d.journey_id),
            RawDeparture::Timetable(_) => None,
        }
    }

    /// Source-formatted display time, if the source provides one.
    pub fn display(&self) -> Option<&str> {
        match self {
            RawDeparture::Site(d) => present(&d.display),
            RawDeparture::Timetable(_) => None,
        }
    }

    /// Resolve the departure instant, preferring realtime over scheduled data.
    ///
    /// Site records use `expected`, falling back to `scheduled` only when
    /// `expected` is absent. Timetable records use the realtime date/time
    /// pair when both halves are present, otherwise the scheduled pair.
    /// Returns `None` when the chosen value is missing or unparseable.
    pub fn resolve_instant(&self, zone: Tz) -> Option<DateTime<Utc>> {
        match self {
            RawDeparture::Site(d) => {
                let chosen = d.expected.as_deref().or(d.scheduled.as_deref())?;
                parse_instant(chosen, zone).ok()
            }
            RawDeparture::Timetable(d) => {
                let (date, time) = match (d.rt_date.as_deref(), d.rt_time.as_deref()) {
                    (Some(date), Some(time)) => (date, time),
                    _ => (d.date.as_deref()?, d.time.as_deref()?),
                };
                parse_date_time(date, time, zone).ok()
            }
        }
    }
}

impl From<SiteDeparture> for RawDeparture {
    fn from(d: SiteDeparture) -> Self {
        RawDeparture::Site(d)
    }
}

impl From<TimetableDeparture> for RawDeparture {
    fn from(d: TimetableDeparture) -> Self {
        RawDeparture::Timetable(d)
    }
}

/// A selected departure, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureDetail {
    pub line_designation: String,
    pub destination: String,
    /// Resolved departure instant.
    pub departure_time: DateTime<Utc>,
    /// `"Nu"`, `"<N> min"`, or the source's own display string.
    pub display_time: String,
}

impl DepartureDetail {
    /// One-line summary: `"<line> <destination> <display time>"`.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DepartureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.line_designation, self.destination, self.display_time
        )
    }
}
