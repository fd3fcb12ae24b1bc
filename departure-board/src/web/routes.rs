//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::domain::DepartureDetail;
use crate::source::SourceError;

use super::dto::ErrorResponse;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/departures", get(departures))
        .route("/departures/details", get(departure_details))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Current selection as summary strings.
async fn departures(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.service.summaries().await?))
}

/// Current selection as structured details.
async fn departure_details(
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartureDetail>>, AppError> {
    Ok(Json(state.service.details().await?))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Upstream did not answer (timeout or connection failure)
    GatewayTimeout { message: String },
    /// Upstream answered with an error status, passed through
    Upstream { status: u16, message: String },
    Internal { message: String },
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        let message = e.to_string();
        match e {
            SourceError::Timeout(_) | SourceError::Connect(_) => {
                AppError::GatewayTimeout { message }
            }
            SourceError::Upstream { status, .. } => AppError::Upstream { status, message },
            _ => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::GatewayTimeout { message } => (StatusCode::GATEWAY_TIMEOUT, message),
            AppError::Upstream { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            ),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        tracing::error!(status = status.as_u16(), error = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
