//! Departure board.
//!
//! Fetches upcoming public-transport departures from a transit API, picks
//! the ones headed for a configured destination, and serves them as JSON
//! or scrolls them across an LED matrix.

pub mod clock;
pub mod config;
pub mod display;
pub mod domain;
pub mod resrobot;
pub mod select;
pub mod service;
pub mod sl;
pub mod source;
pub mod web;
