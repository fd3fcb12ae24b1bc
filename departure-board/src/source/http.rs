//! Shared HTTP plumbing for the upstream clients.

use std::sync::Arc;
use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use super::error::SourceError;

/// How much of an unparseable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// A `reqwest` client with a timeout and a bound on concurrent requests.
#[derive(Debug, Clone)]
pub(crate) struct UpstreamHttp {
    http: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl UpstreamHttp {
    pub(crate) fn new(timeout_secs: u64, max_concurrent: usize) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        })
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    /// Send a request and decode its JSON body.
    ///
    /// Non-success statuses become [`SourceError::Upstream`] carrying the
    /// status code so callers can pass it through.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SourceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SourceError::InvalidConfig("request semaphore closed".to_string()))?;

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                message: body.chars().take(BODY_SNIPPET_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        decode_json(&body).inspect_err(|e| {
            if let SourceError::Json { message, body: Some(snippet) } = e {
                tracing::debug!(error = %message, body = %snippet, "undecodable upstream body");
            }
        })
    }
}

/// Decode a JSON body, keeping a snippet of it on failure.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
    })
}
