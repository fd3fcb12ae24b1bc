//! ResRobot (Trafiklab) timetable client.
//!
//! ResRobot covers all Swedish public transport. Unlike SL it needs an
//! access id, splits times into separate date and time fields, and
//! publishes no journey identifier, so repeated vehicles cannot be
//! collapsed.

mod client;
mod convert;
mod types;

pub use client::{ResRobotClient, ResRobotConfig, StopRef};
pub use convert::{convert_board, convert_departure, first_stop_id};
pub use types::{
    DepartureBoardResponse, LocationEntry, LocationResponse, RrDeparture, RrProduct, StopLocation,
};
