//! Dashboard header KPIs.

use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use super::AppState;
use crate::error::ApiError;
use crate::models::{NodeStatus, SystemStatus};
use crate::repo;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/v1/system/status", get(handler))
}

/// Handle `GET /api/v1/system/status`.
///
/// Counts are taken from the store on every call so the header is always
/// consistent with current state; nothing is cached. The latency figure is
/// an external network measurement injected through configuration, not a
/// database aggregate.
async fn handler(State((pool, config)): State<AppState>) -> Result<Json<SystemStatus>, ApiError> {
    // ---
    let nodes_online = repo::count_nodes_with_status(&pool, NodeStatus::Online).await?;
    let nodes_total = repo::count_nodes(&pool).await?;
    let active_alerts = repo::count_active_alerts(&pool).await?;

    debug!(
        "GET /api/v1/system/status - online={} total={} active_alerts={}",
        nodes_online, nodes_total, active_alerts
    );

    Ok(Json(SystemStatus {
        nodes_online,
        nodes_total,
        active_alerts,
        avg_network_latency_ms: config.avg_network_latency_ms,
    }))
}
