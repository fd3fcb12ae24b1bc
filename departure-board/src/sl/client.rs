//! SL Transport API client.
//!
//! The departures endpoint needs no API key. Sites are addressed by numeric
//! id; a site name can be resolved to an id through the sites list.

use futures::future::BoxFuture;

use crate::domain::RawDeparture;
use crate::source::{DepartureSource, SourceError, UpstreamHttp};

use super::convert::{convert_departures, find_site};
use super::types::{SiteDeparturesResponse, SlSite};

/// Default base URL for the SL Transport API.
const DEFAULT_BASE_URL: &str = "https://transport.integration.sl.se/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 2;

/// How far ahead to ask for departures (minutes).
const DEFAULT_FORECAST_MINS: u16 = 60;

/// How the site is identified in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRef {
    /// Numeric site id, used as-is.
    Id(String),
    /// Site name, resolved through the sites list.
    Name(String),
}

/// Configuration for the SL client.
#[derive(Debug, Clone)]
pub struct SlConfig {
    pub site: SiteRef,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
    pub forecast_mins: u16,
}

impl SlConfig {
    /// Create a new config for the given site.
    pub fn new(site: SiteRef) -> Self {
        Self {
            site,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
            forecast_mins: DEFAULT_FORECAST_MINS,
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

    pub fn with_forecast(mut self, mins: u16) -> Self {
        self.forecast_mins = mins;
        self
    }
}

/// SL Transport API client.
#[derive(Debug, Clone)]
pub struct SlClient {
    http: UpstreamHttp,
    base_url: String,
    site: SiteRef,
    forecast_mins: u16,
}

impl SlClient {
    pub fn new(config: SlConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: UpstreamHttp::new(config.timeout_secs, config.max_concurrent)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            site: config.site,
            forecast_mins: config.forecast_mins,
        })
    }

    /// Fetch every site known to SL.
    pub async fn get_sites(&self) -> Result<Vec<SlSite>, SourceError> {
        let url = format!("{}/sites", self.base_url);
        let request = self.http.get(&url).query(&[("expand", "false")]);
        self.http.get_json(request).await
    }

    /// Fetch departures for a site, converted but unfiltered.
    ///
    /// At most `limit` records are returned, in upstream order.
    pub async fn get_departures(
        &self,
        site_id: &str,
        limit: u32,
    ) -> Result<Vec<RawDeparture>, SourceError> {
        let url = format!("{}/sites/{}/departures", self.base_url, site_id);
        let request = self
            .http
            .get(&url)
            .query(&[("forecast", self.forecast_mins.to_string())]);

        let response: SiteDeparturesResponse = self.http.get_json(request).await?;

        let mut departures = convert_departures(&response);
        departures.truncate(limit as usize);
        Ok(departures)
    }

    /// Resolve the configured site to an id.
    pub async fn resolve_site(&self) -> Result<String, SourceError> {
        match &self.site {
            SiteRef::Id(id) => Ok(id.clone()),
            SiteRef::Name(name) => {
                let sites = self.get_sites().await?;
                let site = find_site(&sites, name)
                    .ok_or_else(|| SourceError::StopNotFound(name.clone()))?;
                tracing::info!(site_id = site.id, site_name = %site.name, "resolved SL site");
                Ok(site.id.to_string())
            }
        }
    }
}

impl DepartureSource for SlClient {
    fn name(&self) -> &'static str {
        "sl"
    }

    fn resolve_marker(&self) -> BoxFuture<'_, Result<String, SourceError>> {
        Box::pin(self.resolve_site())
    }

    fn fetch<'a>(
        &'a self,
        marker: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<RawDeparture>, SourceError>> {
        Box::pin(self.get_departures(marker, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SlConfig::new(SiteRef::Id("9531".into()))
            .with_base_url("http://localhost:8080/")
            .with_timeout(3)
            .with_forecast(30);

        assert_eq!(config.site, SiteRef::Id("9531".into()));
        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.forecast_mins, 30);
    }

    #[test]
    fn config_defaults() {
        let config = SlConfig::new(SiteRef::Name("Älvsjö".into()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.forecast_mins, DEFAULT_FORECAST_MINS);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            SlClient::new(SlConfig::new(SiteRef::Id("1".into())).with_base_url("http://x/")).unwrap();
        assert_eq!(client.base_url, "http://x");
    }

    #[tokio::test]
    async fn site_id_resolves_without_request() {
        // Unroutable base URL: resolving an id must not touch the network
        let client = SlClient::new(
            SlConfig::new(SiteRef::Id("9531".into())).with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();
        assert_eq!(client.resolve_marker().await.unwrap(), "9531");
        assert_eq!(client.name(), "sl");
    }
}
