//! Transit source error types.

/// Errors from fetching departures upstream.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Request did not complete in time
    #[error("upstream request timed out: {0}")]
    Timeout(String),

    /// Could not reach the upstream host
    #[error("could not connect to upstream: {0}")]
    Connect(String),

    /// Any other transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body was not the JSON we expected
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// The configured stop or site could not be found upstream
    #[error("stop not found: {0}")]
    StopNotFound(String),

    /// Mock data could not be loaded
    #[error("mock data error: {0}")]
    Mock(String),

    /// Client could not be built from its configuration
    #[error("invalid source configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_connect() {
            SourceError::Connect(err.to_string())
        } else {
            SourceError::Http(err)
        }
    }
}
