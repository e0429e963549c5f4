//! One-time store population for a fresh deployment.
//!
//! `seed_if_empty` is invoked once from the bootstrap, never from request
//! handling. It checks whether any node exists and only populates a
//! completely empty store, so restarting the process against an existing
//! database is a no-op. The whole seed runs in one transaction: a failure
//! part-way leaves the store empty rather than half-populated.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::models::{AlertSeverity, LogLevel, NodeStatus};
use crate::repo;

// ---

struct SeedNode {
    node_id: &'static str,
    name: &'static str,
    status: NodeStatus,
    firmware: &'static str,
    last_ping: (u32, u32),
}

struct SeedReading {
    node_id: &'static str,
    at: (u32, u32),
    water_level_cm: f64,
    signal_strength_dbm: i64,
}

const SEED_NODES: &[SeedNode] = &[
    SeedNode { node_id: "Andheri-Sub-01", name: "Andheri Subway", status: NodeStatus::Online, firmware: "v1.3.2", last_ping: (18, 2) },
    SeedNode { node_id: "Colaba-Quay-02", name: "Colaba Quay", status: NodeStatus::Online, firmware: "v1.3.0", last_ping: (18, 0) },
    SeedNode { node_id: "Parel-Bridge-03", name: "Parel Bridge", status: NodeStatus::Maintenance, firmware: "v1.2.8", last_ping: (11, 22) },
    SeedNode { node_id: "Dadar-Drain-04", name: "Dadar Drain", status: NodeStatus::Offline, firmware: "v1.2.5", last_ping: (4, 12) },
    SeedNode { node_id: "Bandra-Promenade-05", name: "Bandra Promenade", status: NodeStatus::Online, firmware: "v1.3.1", last_ping: (17, 59) },
    SeedNode { node_id: "Goregaon-Sewage-07", name: "Goregaon Sewage", status: NodeStatus::Offline, firmware: "v1.1.9", last_ping: (9, 2) },
    SeedNode { node_id: "Malad-Lake-08", name: "Malad Lake", status: NodeStatus::Online, firmware: "v1.3.2", last_ping: (18, 4) },
];

// Latest reading per node first, then extra history for Andheri-Sub-01 so
// the detail chart and the latest-reading resolver have more than one row
// to choose from, then the Malad warning reading its alert points at.
const SEED_READINGS: &[SeedReading] = &[
    SeedReading { node_id: "Andheri-Sub-01", at: (18, 2), water_level_cm: 14.2, signal_strength_dbm: -46 },
    SeedReading { node_id: "Colaba-Quay-02", at: (18, 0), water_level_cm: 13.8, signal_strength_dbm: -47 },
    SeedReading { node_id: "Parel-Bridge-03", at: (11, 22), water_level_cm: 11.5, signal_strength_dbm: -52 },
    SeedReading { node_id: "Dadar-Drain-04", at: (4, 12), water_level_cm: 10.2, signal_strength_dbm: -58 },
    SeedReading { node_id: "Bandra-Promenade-05", at: (17, 59), water_level_cm: 13.6, signal_strength_dbm: -49 },
    SeedReading { node_id: "Goregaon-Sewage-07", at: (9, 2), water_level_cm: 9.8, signal_strength_dbm: -60 },
    SeedReading { node_id: "Malad-Lake-08", at: (18, 4), water_level_cm: 15.0, signal_strength_dbm: -44 },
    SeedReading { node_id: "Andheri-Sub-01", at: (18, 1), water_level_cm: 14.1, signal_strength_dbm: -47 },
    SeedReading { node_id: "Andheri-Sub-01", at: (18, 0), water_level_cm: 13.9, signal_strength_dbm: -46 },
    SeedReading { node_id: "Andheri-Sub-01", at: (17, 59), water_level_cm: 13.8, signal_strength_dbm: -48 },
    SeedReading { node_id: "Malad-Lake-08", at: (17, 58), water_level_cm: 14.9, signal_strength_dbm: -44 },
];

fn seed_time(hour: u32, minute: u32) -> DateTime<Utc> {
    // ---
    Utc.with_ymd_and_hms(2025, 10, 31, hour, minute, 0).unwrap()
}

// ---

/// Populate the store with the initial dataset if and only if it is empty.
///
/// Safe to call on every startup. Inserts run in dependency order (nodes,
/// then readings, then the alerts and logs that reference them) inside a
/// single transaction.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<()> {
    // ---
    if repo::count_nodes(pool).await? > 0 {
        tracing::info!("Store already populated, skipping seed");
        return Ok(());
    }

    tracing::info!("Store is empty, seeding initial dataset");

    let mut tx = pool.begin().await?;
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    for node in SEED_NODES {
        sqlx::query(
            r#"
            INSERT INTO nodes (node_id, name, location_desc, status, firmware_version, last_ping, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(node.node_id)
        .bind(node.name)
        .bind(format!("Deployment site for {}", node.name))
        .bind(node.status)
        .bind(node.firmware)
        .bind(seed_time(node.last_ping.0, node.last_ping.1))
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    }

    let mut critical_reading_id = None;
    let mut warning_reading_id = None;
    for reading in SEED_READINGS {
        let result = sqlx::query(
            r#"
            INSERT INTO sensor_readings (node_id, timestamp, water_level_cm, signal_strength_dbm)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(reading.node_id)
        .bind(seed_time(reading.at.0, reading.at.1))
        .bind(reading.water_level_cm)
        .bind(reading.signal_strength_dbm)
        .execute(&mut *tx)
        .await?;

        // Remember the two readings the seed alerts point at
        if reading.node_id == "Andheri-Sub-01" && reading.at == (18, 2) {
            critical_reading_id = Some(result.last_insert_rowid());
        }
        if reading.node_id == "Malad-Lake-08" && reading.at == (17, 58) {
            warning_reading_id = Some(result.last_insert_rowid());
        }
    }

    let seed_alerts = [
        ("Andheri-Sub-01", critical_reading_id, (18, 2), AlertSeverity::Critical),
        ("Malad-Lake-08", warning_reading_id, (17, 58), AlertSeverity::Warning),
    ];
    for (node_id, reading_id, at, severity) in seed_alerts {
        let reading_id =
            reading_id.ok_or_else(|| anyhow::anyhow!("seed alert for {node_id} has no reading"))?;
        sqlx::query(
            r#"
            INSERT INTO alerts (node_id, reading_id, timestamp, severity, verification_image_url, is_acknowledged)
            VALUES ($1, $2, $3, $4, $5, 0)
            "#,
        )
        .bind(node_id)
        .bind(reading_id)
        .bind(seed_time(at.0, at.1))
        .bind(severity)
        .bind("https://i.imgur.com/g8xG8dM.jpeg")
        .execute(&mut *tx)
        .await?;
    }

    let seed_logs = [
        ((18, 1), "Gateway", LogLevel::Info, "Node ping successful"),
        ((18, 2), "Node Andheri-Sub-01", LogLevel::Warn, "Water level high"),
        ((18, 3), "API", LogLevel::Info, "Alert dispatched"),
        ((18, 4), "Node Goregaon-Sewage-07", LogLevel::Error, "Node offline"),
        ((18, 5), "System", LogLevel::Info, "System heartbeat OK"),
    ];
    for (at, source, level, message) in seed_logs {
        sqlx::query(
            r#"
            INSERT INTO event_logs (timestamp, source, log_level, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(seed_time(at.0, at.1))
        .bind(source)
        .bind(level)
        .bind(message)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        "Seed complete: {} nodes, {} readings",
        SEED_NODES.len(),
        SEED_READINGS.len()
    );
    Ok(())
}
