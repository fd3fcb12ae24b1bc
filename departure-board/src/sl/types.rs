//! SL Transport API response DTOs.
//!
//! These map directly to the JSON returned by the SL Transport API. Fields
//! are optional throughout because the API leaves them out freely.

use serde::Deserialize;

/// Response from `GET /sites/{id}/departures`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDeparturesResponse {
    /// Upcoming departures at the site. May be missing or `null` when
    /// nothing is running.
    pub departures: Option<Vec<SlDeparture>>,
}

/// A single departure from a site.
#[derive(Debug, Clone, Deserialize)]
pub struct SlDeparture {
    /// Destination as shown on the vehicle.
    pub destination: Option<String>,

    /// Direction of travel, e.g. `"Östberghöjden"`.
    pub direction: Option<String>,

    /// 1 or 2, the line's direction of travel.
    pub direction_code: Option<u8>,

    /// Prediction state, e.g. `"EXPECTED"` or `"ATSTOP"`.
    pub state: Option<String>,

    /// Countdown formatted by SL: `"Nu"`, `"5 min"` or `"12:34"`.
    pub display: Option<String>,

    /// Timetabled departure (local time, no offset).
    pub scheduled: Option<String>,

    /// Predicted departure (local time, no offset).
    pub expected: Option<String>,

    /// The vehicle journey this departure belongs to.
    pub journey: Option<SlJourney>,

    /// The platform or stop point within the site.
    pub stop_point: Option<SlStopPoint>,

    /// The line being served.
    pub line: Option<SlLine>,
}

/// Journey reference. `id` is a number in practice but treated as opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct SlJourney {
    pub id: Option<serde_json::Value>,
    pub state: Option<String>,
    pub prediction_state: Option<String>,
}

/// Stop point (platform) within a site.
#[derive(Debug, Clone, Deserialize)]
pub struct SlStopPoint {
    pub id: Option<i64>,
    pub name: Option<String>,
    /// Platform letter/number, e.g. `"A"` or `"B"`.
    pub designation: Option<String>,
}

/// Line information.
#[derive(Debug, Clone, Deserialize)]
pub struct SlLine {
    pub id: Option<i64>,
    /// Public line number, e.g. `"134"`.
    pub designation: Option<String>,
    pub transport_mode: Option<String>,
    pub group_of_lines: Option<String>,
}

/// Entry in the `GET /sites` list.
#[derive(Debug, Clone, Deserialize)]
pub struct SlSite {
    pub id: i64,
    pub name: String,
    pub abbreviation: Option<String>,
}
