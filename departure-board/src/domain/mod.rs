//! Domain types for the departure board.
//!
//! Raw upstream records go in, selected departures come out. Time parsing
//! lives here too because both record shapes need it.

mod departure;
mod time;

pub use departure::{DepartureDetail, RawDeparture, SiteDeparture, TimetableDeparture};
pub use time::{TimeError, parse_date_time, parse_instant};
