//! Error taxonomy for the floodwatch API.
//!
//! Three failure classes cross the HTTP boundary:
//! - `NotFound` — unknown entity id on a detail/action endpoint → 404
//! - `ReferentialIntegrity` — a write referencing a nonexistent parent
//!   entity (or an alert whose node does not match its reading's node) → 422
//! - `Unavailable` — the backing store failed or is unreachable → 503
//!
//! Every failure is rendered as a plain structured body with a `message`
//! field; there are no partial-success responses.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use thiserror::Error;

// ---

/// Main error type for the dashboard API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("Store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        // ---
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ReferentialIntegrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
