//! ResRobot departure board client.

use futures::future::BoxFuture;

use crate::domain::RawDeparture;
use crate::source::{DepartureSource, SourceError, UpstreamHttp};

use super::convert::{convert_board, first_stop_id};
use super::types::{DepartureBoardResponse, LocationResponse};

/// Default base URL for ResRobot v2.1.
const DEFAULT_BASE_URL: &str = "https://api.resrobot.se/v2.1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Time window for the departure board (minutes).
const DEFAULT_DURATION_MINS: u16 = 120;

/// How the stop is identified in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopRef {
    /// Stop `extId`, used as-is.
    Id(String),
    /// Station name, resolved through `location.name`.
    Name(String),
}

/// Configuration for the ResRobot client.
#[derive(Debug, Clone)]
pub struct ResRobotConfig {
    /// Trafiklab access id (API key)
    pub access_id: String,
    pub stop: StopRef,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
    pub duration_mins: u16,
}

impl ResRobotConfig {
    /// Create a new config with the given access id and stop.
    pub fn new(access_id: impl Into<String>, stop: StopRef) -> Self {
        Self {
            access_id: access_id.into(),
            stop,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
            duration_mins: DEFAULT_DURATION_MINS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_duration(mut self, mins: u16) -> Self {
        self.duration_mins = mins;
        self
    }
}

/// ResRobot departure board client.
#[derive(Debug, Clone)]
pub struct ResRobotClient {
    http: UpstreamHttp,
    base_url: String,
    access_id: String,
    stop: StopRef,
    duration_mins: u16,
}

impl ResRobotClient {
    pub fn new(config: ResRobotConfig) -> Result<Self, SourceError> {
        if config.access_id.trim().is_empty() {
            return Err(SourceError::InvalidConfig(
                "ResRobot access id must not be empty".to_string(),
            ));
        }

        Ok(Self {
            http: UpstreamHttp::new(config.timeout_secs, config.max_concurrent)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_id: config.access_id,
            stop: config.stop,
            duration_mins: config.duration_mins,
        })
    }

    /// Look up the `extId` of the first stop matching `name`.
    pub async fn find_stop(&self, name: &str) -> Result<String, SourceError> {
        let url = format!("{}/location.name", self.base_url);
        let request = self.http.get(&url).query(&[
            ("input", name),
            ("format", "json"),
            ("accessId", self.access_id.as_str()),
        ]);

        let response: LocationResponse = self.http.get_json(request).await?;
        first_stop_id(&response).ok_or_else(|| SourceError::StopNotFound(name.to_string()))
    }

    /// Fetch the departure board for a stop, converted but unfiltered.
    pub async fn get_departures(
        &self,
        stop_id: &str,
        limit: u32,
    ) -> Result<Vec<RawDeparture>, SourceError> {
        let url = format!("{}/departureBoard", self.base_url);
        let request = self.http.get(&url).query(&[
            ("id", stop_id.to_string()),
            ("format", "json".to_string()),
            ("accessId", self.access_id.clone()),
            ("maxJourneys", limit.to_string()),
            ("duration", self.duration_mins.to_string()),
        ]);

        let response: DepartureBoardResponse = self.http.get_json(request).await?;
        Ok(convert_board(&response))
    }

    /// Resolve the configured stop to an `extId`.
    pub async fn resolve_stop(&self) -> Result<String, SourceError> {
        match &self.stop {
            StopRef::Id(id) => Ok(id.clone()),
            StopRef::Name(name) => {
                let id = self.find_stop(name).await?;
                tracing::info!(stop_id = %id, station = %name, "resolved ResRobot stop");
                Ok(id)
            }
        }
    }
}

impl DepartureSource for ResRobotClient {
    fn name(&self) -> &'static str {
        "resrobot"
    }

    fn resolve_marker(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        Box::pin(self.resolve_stop())
    }

    fn fetch<'a>(
        &'a self,
        marker: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<RawDeparture>, SourceError>> {
        Box::pin(self.get_departures(marker, limit))
    }
}
