//! Conversion from ResRobot DTOs to raw departures.

use crate::domain::{RawDeparture, TimetableDeparture};

use super::types::{DepartureBoardResponse, LocationResponse, RrDeparture};

/// Convert a departure board; a missing list is an empty board.
pub fn convert_board(response: &DepartureBoardResponse) -> Vec<RawDeparture> {
    response
        .departures
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(convert_departure)
        .collect()
}

/// Convert a single ResRobot departure.
///
/// The realtime track wins over the scheduled one. The product name is kept
/// as the line fallback for services without a transport number.
pub fn convert_departure(dep: &RrDeparture) -> RawDeparture {
    let product_name = dep
        .product
        .iter()
        .find_map(|p| p.name.clone())
        .or_else(|| dep.name.clone());

    RawDeparture::Timetable(TimetableDeparture {
        direction: dep.direction.clone(),
        line_number: dep.transport_number.clone(),
        track: dep.rt_track.clone().or_else(|| dep.track.clone()),
        date: dep.date.clone(),
        time: dep.time.clone(),
        rt_date: dep.rt_date.clone(),
        rt_time: dep.rt_time.clone(),
        product_name,
    })
}

/// First stop `extId` in a location search.
pub fn first_stop_id(response: &LocationResponse) -> Option<String> {
    response
        .stop_location_or_coord_location
        .iter()
        .filter_map(|entry| entry.stop_location.as_ref())
        .find_map(|stop| stop.ext_id.clone())
}
