//! Application state for the web layer.

use std::sync::Arc;

use crate::service::DepartureService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DepartureService>,
}

impl AppState {
    pub fn new(service: Arc<DepartureService>) -> Self {
        Self { service }
    }
}
