//! System event log feed.

use axum::{extract::State, routing::get, Json, Router};

use super::AppState;
use crate::error::ApiError;
use crate::models::EventLog;
use crate::repo;

/// Number of entries returned on the event log feed.
const EVENT_LOG_LIMIT: i64 = 50;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/v1/logs/events", get(handler))
}

/// Handle `GET /api/v1/logs/events`: the latest 50 entries, newest first.
async fn handler(State((pool, _config)): State<AppState>) -> Result<Json<Vec<EventLog>>, ApiError> {
    // ---
    let logs = repo::recent_event_logs(&pool, EVENT_LOG_LIMIT).await?;
    Ok(Json(logs))
}
