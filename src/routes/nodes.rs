//! Node listing and detail views.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::AppState;
use crate::error::ApiError;
use crate::models::{NodeDetail, NodeWithLatestReading};
use crate::repo;

/// Readings window returned on the node detail view.
const RECENT_READINGS_LIMIT: i64 = 20;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/v1/nodes", get(list_nodes))
        .route("/api/v1/nodes/{node_id}", get(node_detail))
}

/// Handle `GET /api/v1/nodes`.
///
/// Lists every registered node with its most recent reading, resolved per
/// node rather than as one global maximum. This issues one top-1 query per
/// node; the `(node_id, timestamp)` index keeps each lookup cheap, but the
/// listing is still linear in the node count. Known scaling limit.
async fn list_nodes(
    State((pool, _config)): State<AppState>,
) -> Result<Json<Vec<NodeWithLatestReading>>, ApiError> {
    // ---
    let nodes = repo::list_nodes(&pool).await?;
    info!("GET /api/v1/nodes - listing {} nodes", nodes.len());

    let mut rows = Vec::with_capacity(nodes.len());
    for node in nodes {
        let latest = repo::latest_reading(&pool, &node.node_id).await?;
        rows.push(NodeWithLatestReading::from_parts(node, latest));
    }

    Ok(Json(rows))
}

/// Handle `GET /api/v1/nodes/{node_id}`.
///
/// Returns the full node record plus its last 20 readings, newest first.
/// 404 for an unknown node id.
async fn node_detail(
    Path(node_id): Path<String>,
    State((pool, _config)): State<AppState>,
) -> Result<Json<NodeDetail>, ApiError> {
    // ---
    let node = repo::get_node(&pool, &node_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Node {node_id}")))?;

    let recent_readings = repo::recent_readings(&pool, &node_id, RECENT_READINGS_LIMIT).await?;

    Ok(Json(NodeDetail {
        node,
        recent_readings,
    }))
}
