//! ResRobot (Trafiklab) response DTOs.
//!
//! ResRobot uses PascalCase for collections and camelCase for fields, and
//! sends a single object where a one-element array would be expected in some
//! responses. Everything is optional.

use serde::{Deserialize, Deserializer};

/// Response from `GET /departureBoard`.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartureBoardResponse {
    /// Departures from the stop. Missing when nothing is running.
    #[serde(rename = "Departure", default)]
    pub departures: Option<Vec<RrDeparture>>,
}

/// A single departure on the board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RrDeparture {
    /// Full service name, e.g. `"Länstrafik - Buss 134"`.
    pub name: Option<String>,

    /// Name of the stop the board is for.
    pub stop: Option<String>,

    /// Stop `extId`.
    pub stopid: Option<String>,

    /// Scheduled departure time, `HH:MM:SS`.
    pub time: Option<String>,

    /// Scheduled departure date, `YYYY-MM-DD`.
    pub date: Option<String>,

    /// Realtime departure time, when the operator publishes one.
    pub rt_time: Option<String>,

    /// Realtime departure date.
    pub rt_date: Option<String>,

    /// Final destination of the service.
    pub direction: Option<String>,

    /// Public line number, e.g. `"134"`.
    pub transport_number: Option<String>,

    /// Scheduled platform or track.
    pub track: Option<String>,

    /// Realtime platform or track.
    pub rt_track: Option<String>,

    /// Product details; the API sends either one object or an array.
    #[serde(rename = "Product", default, deserialize_with = "one_or_many")]
    pub product: Vec<RrProduct>,
}

/// Product (line/operator) information.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RrProduct {
    pub name: Option<String>,
    pub num: Option<String>,
    pub cat_code: Option<String>,
    pub cat_out: Option<String>,
    pub operator: Option<String>,
}

/// Response from `GET /location.name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    #[serde(default)]
    pub stop_location_or_coord_location: Vec<LocationEntry>,
}

/// One hit of a location search; only stop hits are of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationEntry {
    #[serde(rename = "StopLocation")]
    pub stop_location: Option<StopLocation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLocation {
    pub ext_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}
