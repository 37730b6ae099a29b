//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup
//! failures and `HandlerError` for failures surfaced to HTTP clients.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use study_buddy_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Errors returned by request handlers, rendered as `{ "error": message }`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Missing, malformed or duplicate input.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials. The message never says which field was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No calendar token in the current session.
    #[error("Not connected")]
    NotConnected,

    /// The calendar provider failed. The detail is logged, not returned.
    #[error("{0}")]
    Upstream(&'static str),

    #[error("Calendar integration is not configured")]
    CalendarDisabled,

    #[error("Internal server error")]
    Internal(#[from] PortError),
}

/// A body that is not JSON, or does not fit the request type, is bad input
/// like any other.
impl From<JsonRejection> for HandlerError {
    fn from(rejection: JsonRejection) -> Self {
        HandlerError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match &self {
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::InvalidCredentials | HandlerError::NotConnected => {
                StatusCode::UNAUTHORIZED
            }
            HandlerError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::CalendarDisabled => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::Internal(e) => {
                error!("Request failed: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
