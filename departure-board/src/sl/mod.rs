//! SL Transport API client (Stockholm).
//!
//! Key characteristics of the SL API:
//! - No API key is needed for departures
//! - Times are naive local timestamps (`"2024-03-15T10:03:12"`)
//! - Each departure carries a pre-formatted `display` countdown
//! - `journey.id` identifies the vehicle run and repeats when the same
//!   vehicle is listed twice

mod client;
mod convert;
mod types;

pub use client::{SiteRef, SlClient, SlConfig};
pub use convert::{convert_departure, convert_departures, find_site};
pub use types::{SiteDeparturesResponse, SlDeparture, SlJourney, SlLine, SlSite, SlStopPoint};
