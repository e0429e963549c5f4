// src/routes/health.rs
//! Liveness endpoint for the floodwatch backend.
//!
//! Used by the dashboard and deployment probes to verify that the service is
//! running and able to respond to HTTP requests. It is a sibling module in
//! the `routes` directory: the handler stays internal to this file and the
//! gateway (`mod.rs`) merges the subrouter, so `main.rs` never sees
//! individual endpoints.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the health endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handle `GET /api/v1/health`.
///
/// Returns a static JSON object indicating the API is reachable. This
/// endpoint is deliberately lightweight and does not touch the database.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create a subrouter containing the health route.
///
/// Generic over the application state so it merges cleanly with the gateway
/// router regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api/v1/health", get(health))
}
