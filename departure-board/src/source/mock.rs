//! Mock departure source for running without API access.
//!
//! Loads a saved upstream response from a JSON file and serves it for any
//! marker, as if it were live. Both SL and ResRobot response shapes are
//! accepted; the shape is detected from the top-level key.

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::domain::RawDeparture;
use crate::resrobot::{DepartureBoardResponse, convert_board};
use crate::sl::{SiteDeparturesResponse, convert_departures};

use super::error::SourceError;
use super::DepartureSource;

/// Marker reported by the mock source.
pub const MOCK_MARKER: &str = "mock";

/// Mock source that serves a fixed set of departures.
#[derive(Debug, Clone)]
pub struct MockSource {
    departures: Arc<Vec<RawDeparture>>,
}

impl MockSource {
    /// Serve the given records.
    pub fn new(departures: Vec<RawDeparture>) -> Self {
        Self {
            departures: Arc::new(departures),
        }
    }

    /// Load an SL or ResRobot departures response from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Mock(format!("failed to read {}: {e}", path.display())))?;

        let departures = parse_board(&json)
            .map_err(|e| SourceError::Mock(format!("failed to parse {}: {e}", path.display())))?;

        tracing::info!(
            file = %path.display(),
            count = departures.len(),
            "loaded mock departures"
        );
        Ok(Self::new(departures))
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}

/// Parse a saved response, detecting which upstream produced it.
fn parse_board(json: &str) -> Result<Vec<RawDeparture>, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let Value::Object(map) = &value else {
        return Err("expected a JSON object".to_string());
    };

    if map.contains_key("departures") {
        let response: SiteDeparturesResponse =
            serde_json::from_value(value).map_err(|e| e.to_string())?;
        Ok(convert_departures(&response))
    } else if map.contains_key("Departure") {
        let response: DepartureBoardResponse =
            serde_json::from_value(value).map_err(|e| e.to_string())?;
        Ok(convert_board(&response))
    } else {
        Err("expected a `departures` (SL) or `Departure` (ResRobot) list".to_string())
    }
}

impl DepartureSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn resolve_marker(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        Box::pin(async { Ok(MOCK_MARKER.to_string()) })
    }

    fn fetch<'a>(
        &'a self,
        _marker: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<RawDeparture>, SourceError>> {
        Box::pin(async move {
            Ok(self
                .departures
                .iter()
                .take(limit as usize)
                .cloned()
                .collect())
        })
    }
}
