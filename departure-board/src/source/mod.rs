//! Transit sources.
//!
//! A source knows how to find its upstream stop (the identity marker) and
//! how to fetch raw departures for it. Sources never filter: everything
//! they return goes to the selector as-is.

mod error;
mod http;
mod mock;

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::domain::RawDeparture;
use crate::resrobot::{ResRobotClient, ResRobotConfig};
use crate::sl::{SlClient, SlConfig};

pub use error::SourceError;
pub(crate) use http::UpstreamHttp;
pub use mock::{MOCK_MARKER, MockSource};

/// An upstream provider of raw departures.
pub trait DepartureSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Look up the upstream identity marker (stop or site id).
    fn resolve_marker(&self) -> BoxFuture<'_, Result<String, SourceError>>;

    /// Fetch at most `limit` raw departures for a marker.
    fn fetch<'a>(
        &'a self,
        marker: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<RawDeparture>, SourceError>>;
}

/// Which source to use, with its settings.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Sl(SlConfig),
    ResRobot(ResRobotConfig),
    Mock { path: PathBuf },
}

impl SourceConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Sl(_) => "sl",
            SourceConfig::ResRobot(_) => "resrobot",
            SourceConfig::Mock { .. } => "mock",
        }
    }
}

/// Build the configured source.
pub fn connect(config: &SourceConfig) -> Result<Arc<dyn DepartureSource>, SourceError> {
    let source: Arc<dyn DepartureSource> = match config {
        SourceConfig::Sl(sl) => Arc::new(SlClient::new(sl.clone())?),
        SourceConfig::ResRobot(rr) => Arc::new(ResRobotClient::new(rr.clone())?),
        SourceConfig::Mock { path } => Arc::new(MockSource::from_file(path)?),
    };
    tracing::debug!(source = source.name(), "departure source ready");
    Ok(source)
}
