//! Data model for the flood-sensor network: entities, closed enums, and the
//! JSON response shapes consumed by the dashboard frontend.
//!
//! Enum serialization labels are fixed strings the frontend matches on
//! (`"Online"`, `"Critical"`, `"WARN"`, ...) and must not drift with variant
//! renames. Response bodies are camelCase; the database columns stay
//! snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Connectivity status of a sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum NodeStatus {
    Online,
    Offline,
    Maintenance,
}

/// Severity of a raised alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Level of an event log entry. Serialized uppercase ("INFO"/"WARN"/"ERROR").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

// ---

/// A physical sensor unit. `node_id` is assigned externally at provisioning
/// time and is never reused or mutated.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: String,
    pub name: String,
    pub location_desc: Option<String>,
    pub status: NodeStatus,
    pub firmware_version: Option<String>,
    pub last_ping: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One timestamped water-level/signal measurement from a node. Append-only;
/// `reading_id` is a monotonic surrogate assigned by the store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub reading_id: i64,
    pub node_id: String,
    pub timestamp: DateTime<Utc>,
    pub water_level_cm: f64,
    pub signal_strength_dbm: i64,
}

/// A raised condition tied to the reading that triggered it. The only
/// observable mutation in its lifetime is acknowledgment, which is monotonic.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub alert_id: i64,
    pub node_id: String,
    pub reading_id: i64,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub verification_image_url: Option<String>,
    pub is_acknowledged: bool,
}

/// Immutable audit/diagnostic trail entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    pub log_id: i64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub log_level: LogLevel,
    pub message: String,
}

// ---

/// Insert shape for a reading; the store assigns `reading_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSensorReading {
    pub node_id: String,
    pub timestamp: DateTime<Utc>,
    pub water_level_cm: f64,
    pub signal_strength_dbm: i64,
}

/// Insert shape for an alert; the store assigns `alert_id` and alerts start
/// unacknowledged.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAlert {
    pub node_id: String,
    pub reading_id: i64,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub verification_image_url: Option<String>,
}

/// Insert shape for an event log entry; the store assigns `log_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEventLog {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub log_level: LogLevel,
    pub message: String,
}

// ---

/// Node listing row: node attributes plus its latest reading, when one
/// exists. `water_level_cm`/`signal_strength_dbm` are absent for nodes that
/// have never reported.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeWithLatestReading {
    pub node_id: String,
    pub name: String,
    pub location_desc: Option<String>,
    pub status: NodeStatus,
    pub firmware_version: Option<String>,
    pub last_ping: Option<DateTime<Utc>>,
    pub water_level_cm: Option<f64>,
    pub signal_strength_dbm: Option<i64>,
}

impl NodeWithLatestReading {
    pub fn from_parts(node: Node, latest: Option<SensorReading>) -> Self {
        // ---
        NodeWithLatestReading {
            node_id: node.node_id,
            name: node.name,
            location_desc: node.location_desc,
            status: node.status,
            firmware_version: node.firmware_version,
            last_ping: node.last_ping,
            water_level_cm: latest.as_ref().map(|r| r.water_level_cm),
            signal_strength_dbm: latest.as_ref().map(|r| r.signal_strength_dbm),
        }
    }
}

/// Node detail view: the full node record plus its most recent readings,
/// newest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetail {
    #[serde(flatten)]
    pub node: Node,
    pub recent_readings: Vec<SensorReading>,
}

/// KPI block for the dashboard header, recomputed on every request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub nodes_online: i64,
    pub nodes_total: i64,
    pub active_alerts: i64,
    pub avg_network_latency_ms: u32,
}
