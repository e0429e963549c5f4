use axum::Router;
use sqlx::SqlitePool;

use crate::Config;

mod alerts;
mod health;
mod logs;
mod nodes;
mod system;

// ---

/// Shared state handed to every route: the store handle plus the immutable
/// configuration snapshot.
pub type AppState = (SqlitePool, Config);

pub fn router(pool: SqlitePool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(health::router())
        .merge(system::router())
        .merge(nodes::router())
        .merge(alerts::router())
        .merge(logs::router())
        .with_state((pool, config))
}
