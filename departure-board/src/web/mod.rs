//! Web layer for the departure board.
//!
//! Serves the current selection as JSON.

mod dto;
mod routes;
mod state;

pub use dto::ErrorResponse;
pub use routes::{AppError, create_router};
pub use state::AppState;
