//! Alert listing and acknowledgment.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::AppState;
use crate::error::ApiError;
use crate::models::Alert;
use crate::repo;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/v1/alerts", get(list_alerts))
        .route("/api/v1/alerts/{alert_id}/ack", post(acknowledge))
}

/// Handle `GET /api/v1/alerts`.
///
/// All alerts, unacknowledged first so the dashboard surfaces open
/// conditions, newest first within each group.
async fn list_alerts(
    State((pool, _config)): State<AppState>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    // ---
    let alerts = repo::list_alerts(&pool).await?;
    Ok(Json(alerts))
}

/// Handle `POST /api/v1/alerts/{alert_id}/ack`.
///
/// Acknowledges the alert and returns the updated record. Repeated
/// acknowledgments return the already-acknowledged alert without side
/// effects; an unknown id is a 404.
async fn acknowledge(
    Path(alert_id): Path<i64>,
    State((pool, _config)): State<AppState>,
) -> Result<Json<Alert>, ApiError> {
    // ---
    let alert = repo::acknowledge_alert(&pool, alert_id).await?;
    info!(
        "POST /api/v1/alerts/{}/ack - node={} acknowledged",
        alert_id, alert.node_id
    );
    Ok(Json(alert))
}
