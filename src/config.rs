//! Configuration loader for the floodwatch backend.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). Consolidating configuration logic here
//! avoids scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// SQLite connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server binds to.
    pub bind_port: u16,

    /// Average network latency reported on the dashboard header, in
    /// milliseconds. This is an externally measured figure, not a database
    /// aggregate, so it is injected here rather than computed.
    pub avg_network_latency_ms: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DATABASE_URL` – SQLite connection string (default: `sqlite://floodwatch.db?mode=rwc`)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BIND_PORT` – HTTP listen port (default: 8080)
/// - `AVG_NETWORK_LATENCY_MS` – reported latency KPI (default: 43)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = env_or!("DATABASE_URL", "sqlite://floodwatch.db?mode=rwc");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let bind_port = parse_env_u32!("BIND_PORT", 8080);
    let bind_port = u16::try_from(bind_port).map_err(|_| anyhow!("Invalid BIND_PORT: {bind_port}"))?;
    let avg_network_latency_ms = parse_env_u32!("AVG_NETWORK_LATENCY_MS", 43);

    Ok(Config {
        db_url,
        db_pool_max,
        bind_port,
        avg_network_latency_ms,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL           : {}", self.db_url);
        tracing::info!("  DB_POOL_MAX            : {}", self.db_pool_max);
        tracing::info!("  BIND_PORT              : {}", self.bind_port);
        tracing::info!("  AVG_NETWORK_LATENCY_MS : {}", self.avg_network_latency_ms);
    }
}
