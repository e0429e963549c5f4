//! Data-access layer: every query and mutation against the entity store.
//!
//! The store is the single source of truth; nothing here caches between
//! calls. Each function takes the pool (or joins an open transaction) as an
//! explicit handle, and writes that reference a parent entity verify the
//! parent first so callers get a descriptive `ReferentialIntegrity` error
//! instead of a bare constraint violation.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::models::{
    Alert, EventLog, LogLevel, NewAlert, NewEventLog, NewSensorReading, Node, NodeStatus,
    SensorReading,
};

// ---
// Nodes

/// Insert a fully formed node record. `node_id` comes from provisioning and
/// is the natural primary key.
pub async fn insert_node(pool: &SqlitePool, node: &Node) -> Result<(), ApiError> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO nodes (node_id, name, location_desc, status, firmware_version, last_ping, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&node.node_id)
    .bind(&node.name)
    .bind(&node.location_desc)
    .bind(node.status)
    .bind(&node.firmware_version)
    .bind(node.last_ping)
    .bind(node.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_node(pool: &SqlitePool, node_id: &str) -> Result<Option<Node>, ApiError> {
    // ---
    let node = sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE node_id = $1")
        .bind(node_id)
        .fetch_optional(pool)
        .await?;

    Ok(node)
}

pub async fn list_nodes(pool: &SqlitePool) -> Result<Vec<Node>, ApiError> {
    // ---
    let nodes = sqlx::query_as::<_, Node>("SELECT * FROM nodes ORDER BY node_id")
        .fetch_all(pool)
        .await?;

    Ok(nodes)
}

pub async fn count_nodes(pool: &SqlitePool) -> Result<i64, ApiError> {
    // ---
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM nodes")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn count_nodes_with_status(
    pool: &SqlitePool,
    status: NodeStatus,
) -> Result<i64, ApiError> {
    // ---
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM nodes WHERE status = $1")
        .bind(status)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

// ---
// Sensor readings

/// Append a reading for an existing node. Fails with `ReferentialIntegrity`
/// if the node is unknown.
pub async fn insert_reading(
    pool: &SqlitePool,
    reading: &NewSensorReading,
) -> Result<SensorReading, ApiError> {
    // ---
    if get_node(pool, &reading.node_id).await?.is_none() {
        return Err(ApiError::ReferentialIntegrity(format!(
            "reading references unknown node '{}'",
            reading.node_id
        )));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO sensor_readings (node_id, timestamp, water_level_cm, signal_strength_dbm)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&reading.node_id)
    .bind(reading.timestamp)
    .bind(reading.water_level_cm)
    .bind(reading.signal_strength_dbm)
    .execute(pool)
    .await?;

    Ok(SensorReading {
        reading_id: result.last_insert_rowid(),
        node_id: reading.node_id.clone(),
        timestamp: reading.timestamp,
        water_level_cm: reading.water_level_cm,
        signal_strength_dbm: reading.signal_strength_dbm,
    })
}

/// Resolve the most recent reading for one node, or `None` if the node has
/// never reported. Ties on identical timestamps go to the highest
/// `reading_id` (most recently inserted) so the result is deterministic.
pub async fn latest_reading(
    pool: &SqlitePool,
    node_id: &str,
) -> Result<Option<SensorReading>, ApiError> {
    // ---
    let reading = sqlx::query_as::<_, SensorReading>(
        r#"
        SELECT * FROM sensor_readings
        WHERE node_id = $1
        ORDER BY timestamp DESC, reading_id DESC
        LIMIT 1
        "#,
    )
    .bind(node_id)
    .fetch_optional(pool)
    .await?;

    Ok(reading)
}

/// Most recent readings for a node, newest first.
pub async fn recent_readings(
    pool: &SqlitePool,
    node_id: &str,
    limit: i64,
) -> Result<Vec<SensorReading>, ApiError> {
    // ---
    let readings = sqlx::query_as::<_, SensorReading>(
        r#"
        SELECT * FROM sensor_readings
        WHERE node_id = $1
        ORDER BY timestamp DESC, reading_id DESC
        LIMIT $2
        "#,
    )
    .bind(node_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(readings)
}

// ---
// Alerts

/// Create an alert against an existing node and reading. The alert's node
/// must match the triggering reading's node; a mismatch is rejected at write
/// time rather than left as an application-level assumption.
pub async fn insert_alert(pool: &SqlitePool, alert: &NewAlert) -> Result<Alert, ApiError> {
    // ---
    if get_node(pool, &alert.node_id).await?.is_none() {
        return Err(ApiError::ReferentialIntegrity(format!(
            "alert references unknown node '{}'",
            alert.node_id
        )));
    }

    let reading = sqlx::query_as::<_, SensorReading>(
        "SELECT * FROM sensor_readings WHERE reading_id = $1",
    )
    .bind(alert.reading_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        ApiError::ReferentialIntegrity(format!(
            "alert references unknown reading {}",
            alert.reading_id
        ))
    })?;

    if reading.node_id != alert.node_id {
        return Err(ApiError::ReferentialIntegrity(format!(
            "alert node '{}' does not match reading {} node '{}'",
            alert.node_id, alert.reading_id, reading.node_id
        )));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO alerts (node_id, reading_id, timestamp, severity, verification_image_url, is_acknowledged)
        VALUES ($1, $2, $3, $4, $5, 0)
        "#,
    )
    .bind(&alert.node_id)
    .bind(alert.reading_id)
    .bind(alert.timestamp)
    .bind(alert.severity)
    .bind(&alert.verification_image_url)
    .execute(pool)
    .await?;

    Ok(Alert {
        alert_id: result.last_insert_rowid(),
        node_id: alert.node_id.clone(),
        reading_id: alert.reading_id,
        timestamp: alert.timestamp,
        severity: alert.severity,
        verification_image_url: alert.verification_image_url.clone(),
        is_acknowledged: false,
    })
}

/// All alerts for the dashboard: unacknowledged first, newest first within
/// each group.
pub async fn list_alerts(pool: &SqlitePool) -> Result<Vec<Alert>, ApiError> {
    // ---
    let alerts = sqlx::query_as::<_, Alert>(
        r#"
        SELECT * FROM alerts
        ORDER BY is_acknowledged ASC, timestamp DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}

pub async fn count_active_alerts(pool: &SqlitePool) -> Result<i64, ApiError> {
    // ---
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM alerts WHERE is_acknowledged = 0")
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Acknowledge an alert, appending one audit log entry on the first
/// transition only.
///
/// The read, the flag update, and the log append run in a single
/// transaction: two concurrent acknowledgments for the same alert cannot
/// double-log, and a failed log append rolls back the flag. Acknowledging an
/// already-acknowledged alert is a no-op that returns the current record.
pub async fn acknowledge_alert(pool: &SqlitePool, alert_id: i64) -> Result<Alert, ApiError> {
    // ---
    let mut tx = pool.begin().await?;

    let mut alert = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE alert_id = $1")
        .bind(alert_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Alert {alert_id}")))?;

    if alert.is_acknowledged {
        // Second and later acknowledgments observe the terminal state and
        // must not emit a duplicate audit entry.
        return Ok(alert);
    }

    sqlx::query("UPDATE alerts SET is_acknowledged = 1 WHERE alert_id = $1")
        .bind(alert_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO event_logs (timestamp, source, log_level, message)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Utc::now())
    .bind("API")
    .bind(LogLevel::Info)
    .bind(format!(
        "Alert {} ({}) acknowledged by admin.",
        alert_id, alert.node_id
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    alert.is_acknowledged = true;
    Ok(alert)
}

// ---
// Event logs

pub async fn insert_event_log(pool: &SqlitePool, entry: &NewEventLog) -> Result<EventLog, ApiError> {
    // ---
    let result = sqlx::query(
        r#"
        INSERT INTO event_logs (timestamp, source, log_level, message)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(entry.timestamp)
    .bind(&entry.source)
    .bind(entry.log_level)
    .bind(&entry.message)
    .execute(pool)
    .await?;

    Ok(EventLog {
        log_id: result.last_insert_rowid(),
        timestamp: entry.timestamp,
        source: entry.source.clone(),
        log_level: entry.log_level,
        message: entry.message.clone(),
    })
}

/// Latest event log entries, newest first.
pub async fn recent_event_logs(pool: &SqlitePool, limit: i64) -> Result<Vec<EventLog>, ApiError> {
    // ---
    let logs = sqlx::query_as::<_, EventLog>(
        r#"
        SELECT * FROM event_logs
        ORDER BY timestamp DESC, log_id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::AlertSeverity;
    use crate::schema::create_schema;
    use chrono::{DateTime, TimeZone, Utc};
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory store for tests. A single connection keeps every query on
    /// the same memory database.
    async fn mem_pool() -> SqlitePool {
        // ---
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        // ---
        Utc.with_ymd_and_hms(2025, 10, 31, h, m, 0).unwrap()
    }

    fn test_node(node_id: &str, status: NodeStatus) -> Node {
        // ---
        Node {
            node_id: node_id.to_string(),
            name: format!("{node_id} station"),
            location_desc: None,
            status,
            firmware_version: Some("v1.3.2".to_string()),
            last_ping: Some(ts(18, 0)),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    async fn reading_at(
        pool: &SqlitePool,
        node_id: &str,
        at: DateTime<Utc>,
        level: f64,
    ) -> SensorReading {
        // ---
        insert_reading(
            pool,
            &NewSensorReading {
                node_id: node_id.to_string(),
                timestamp: at,
                water_level_cm: level,
                signal_strength_dbm: -46,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_reading_absent_without_readings() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();

        assert!(latest_reading(&pool, "N1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_reading_picks_max_timestamp_per_node() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();
        insert_node(&pool, &test_node("N2", NodeStatus::Online))
            .await
            .unwrap();

        reading_at(&pool, "N1", ts(17, 59), 13.8).await;
        reading_at(&pool, "N1", ts(18, 2), 14.2).await;
        // N2 has a globally later reading; N1's resolution must ignore it
        reading_at(&pool, "N2", ts(18, 4), 15.0).await;

        let latest = latest_reading(&pool, "N1").await.unwrap().unwrap();
        assert_eq!(latest.timestamp, ts(18, 2));
        assert_eq!(latest.water_level_cm, 14.2);
    }

    #[tokio::test]
    async fn test_latest_reading_tie_breaks_on_highest_id() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();

        let first = reading_at(&pool, "N1", ts(18, 0), 13.0).await;
        let second = reading_at(&pool, "N1", ts(18, 0), 13.5).await;
        assert!(second.reading_id > first.reading_id);

        let latest = latest_reading(&pool, "N1").await.unwrap().unwrap();
        assert_eq!(latest.reading_id, second.reading_id);
    }

    #[tokio::test]
    async fn test_insert_reading_rejects_unknown_node() {
        // ---
        let pool = mem_pool().await;

        let err = insert_reading(
            &pool,
            &NewSensorReading {
                node_id: "ghost".to_string(),
                timestamp: ts(18, 0),
                water_level_cm: 12.0,
                signal_strength_dbm: -50,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::ReferentialIntegrity(_)));
    }

    #[tokio::test]
    async fn test_insert_alert_rejects_node_reading_mismatch() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();
        insert_node(&pool, &test_node("N2", NodeStatus::Online))
            .await
            .unwrap();
        let reading = reading_at(&pool, "N1", ts(18, 2), 14.2).await;

        let err = insert_alert(
            &pool,
            &NewAlert {
                node_id: "N2".to_string(),
                reading_id: reading.reading_id,
                timestamp: ts(18, 2),
                severity: AlertSeverity::Critical,
                verification_image_url: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::ReferentialIntegrity(_)));
    }

    #[tokio::test]
    async fn test_insert_alert_rejects_unknown_reading() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();

        let err = insert_alert(
            &pool,
            &NewAlert {
                node_id: "N1".to_string(),
                reading_id: 999,
                timestamp: ts(18, 2),
                severity: AlertSeverity::Warning,
                verification_image_url: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::ReferentialIntegrity(_)));
    }

    #[tokio::test]
    async fn test_acknowledge_unknown_alert_is_not_found() {
        // ---
        let pool = mem_pool().await;

        let err = acknowledge_alert(&pool, 42).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // no state change: the audit trail stays empty
        assert!(recent_event_logs(&pool, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent_and_logs_once() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();
        let reading = reading_at(&pool, "N1", ts(18, 2), 14.2).await;
        let alert = insert_alert(
            &pool,
            &NewAlert {
                node_id: "N1".to_string(),
                reading_id: reading.reading_id,
                timestamp: ts(18, 2),
                severity: AlertSeverity::Critical,
                verification_image_url: None,
            },
        )
        .await
        .unwrap();

        let first = acknowledge_alert(&pool, alert.alert_id).await.unwrap();
        assert!(first.is_acknowledged);

        let second = acknowledge_alert(&pool, alert.alert_id).await.unwrap();
        assert!(second.is_acknowledged);

        let logs = recent_event_logs(&pool, 50).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].source, "API");
        assert_eq!(logs[0].log_level, LogLevel::Info);
        assert!(logs[0].message.contains(&alert.alert_id.to_string()));
        assert!(logs[0].message.contains("N1"));
    }

    #[tokio::test]
    async fn test_list_alerts_unacknowledged_first_then_recency() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();
        let reading = reading_at(&pool, "N1", ts(17, 0), 13.0).await;

        let mut ids = Vec::new();
        for minutes in [10u32, 20, 30, 40] {
            let alert = insert_alert(
                &pool,
                &NewAlert {
                    node_id: "N1".to_string(),
                    reading_id: reading.reading_id,
                    timestamp: ts(17, minutes),
                    severity: AlertSeverity::Warning,
                    verification_image_url: None,
                },
            )
            .await
            .unwrap();
            ids.push(alert.alert_id);
        }

        // acknowledge the newest and the oldest
        acknowledge_alert(&pool, ids[3]).await.unwrap();
        acknowledge_alert(&pool, ids[0]).await.unwrap();

        let listed = list_alerts(&pool).await.unwrap();
        let order: Vec<i64> = listed.iter().map(|a| a.alert_id).collect();
        // unacked (17:30 then 17:20), then acked (17:40 then 17:10)
        assert_eq!(order, vec![ids[2], ids[1], ids[3], ids[0]]);
        assert!(listed[0..2].iter().all(|a| !a.is_acknowledged));
        assert!(listed[2..4].iter().all(|a| a.is_acknowledged));
    }

    #[tokio::test]
    async fn test_node_counts_are_consistent() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();
        insert_node(&pool, &test_node("N2", NodeStatus::Offline))
            .await
            .unwrap();
        insert_node(&pool, &test_node("N3", NodeStatus::Maintenance))
            .await
            .unwrap();

        let online = count_nodes_with_status(&pool, NodeStatus::Online)
            .await
            .unwrap();
        let total = count_nodes(&pool).await.unwrap();
        assert_eq!(online, 1);
        assert_eq!(total, 3);
        assert!(online <= total);
    }

    #[tokio::test]
    async fn test_recent_event_logs_newest_first_with_limit() {
        // ---
        let pool = mem_pool().await;

        for m in 0..8u32 {
            insert_event_log(
                &pool,
                &NewEventLog {
                    timestamp: ts(18, m),
                    source: "Gateway".to_string(),
                    log_level: LogLevel::Info,
                    message: format!("Node ping {m}"),
                },
            )
            .await
            .unwrap();
        }

        let logs = recent_event_logs(&pool, 5).await.unwrap();
        assert_eq!(logs.len(), 5);
        assert_eq!(logs[0].timestamp, ts(18, 7));
        assert!(logs
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[tokio::test]
    async fn test_recent_readings_window_is_newest_first() {
        // ---
        let pool = mem_pool().await;
        insert_node(&pool, &test_node("N1", NodeStatus::Online))
            .await
            .unwrap();

        for m in 0..25u32 {
            reading_at(&pool, "N1", ts(17, m), 12.0 + f64::from(m) / 10.0).await;
        }

        let window = recent_readings(&pool, "N1", 20).await.unwrap();
        assert_eq!(window.len(), 20);
        assert_eq!(window[0].timestamp, ts(17, 24));
        assert!(window
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }
}
