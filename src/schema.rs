//! Database schema management for the floodwatch backend.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::SqlitePool;

// ---

/// Create the database schema (idempotent).
///
/// Creates `nodes`, `sensor_readings`, `alerts`, and `event_logs` with their
/// foreign keys and query indexes. Safe to call on every startup; no-op if
/// the objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS nodes (
            node_id          TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            location_desc    TEXT,
            status           TEXT NOT NULL DEFAULT 'Offline',
            firmware_version TEXT,
            last_ping        TEXT,
            created_at       TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_readings (
            reading_id          INTEGER PRIMARY KEY AUTOINCREMENT,
            node_id             TEXT    NOT NULL REFERENCES nodes (node_id),
            timestamp           TEXT    NOT NULL,
            water_level_cm      REAL    NOT NULL,
            signal_strength_dbm INTEGER NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            alert_id               INTEGER PRIMARY KEY AUTOINCREMENT,
            node_id                TEXT    NOT NULL REFERENCES nodes (node_id),
            reading_id             INTEGER NOT NULL REFERENCES sensor_readings (reading_id),
            timestamp              TEXT    NOT NULL,
            severity               TEXT    NOT NULL DEFAULT 'Warning',
            verification_image_url TEXT,
            is_acknowledged        BOOLEAN NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_logs (
            log_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            source    TEXT NOT NULL,
            log_level TEXT NOT NULL,
            message   TEXT NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Latest-reading resolution is a top-1-by-timestamp lookup per node;
    // without this index the node listing degrades to O(nodes x readings).
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_readings_node_ts
            ON sensor_readings (node_id, timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_alerts_is_acknowledged
            ON alerts (is_acknowledged);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_event_logs_timestamp
            ON event_logs (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
