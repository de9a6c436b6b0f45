//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and handed to the pieces that need
//! it (store pool, transition pipeline, geo resolver, telemetry).
//!
//! ## Required Variables
//!
//! - `DATABASE_URL` - Postgres connection string
//!
//! ## Optional Variables
//!
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `TRANSITION_QUEUE_CAPACITY` - Transition event buffer size (default: 10000, min: 100)
//! - `TRANSITION_TIMEOUT_SECS` - Per-event recording budget (default: 2)
//! - `IPINFO_TOKEN` - IPinfo Lite token; geo resolving is disabled when unset
//! - `GEO_HTTP_TIMEOUT_MS` - Geo lookup HTTP timeout (default: 1500)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `DB_CONNECT_TIMEOUT` - Pool acquire timeout in seconds (default: 30)

use anyhow::{Context, Result};
use std::env;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub log_level: String,
    pub log_format: String,
    /// Capacity of the bounded transition-event queue. Events beyond this are
    /// dropped rather than blocking a redirect.
    pub transition_queue_capacity: usize,
    /// Per-event budget for the background recorder, in seconds.
    pub transition_timeout_secs: u64,
    /// IPinfo Lite token. Geo resolution degrades to "unknown" when unset.
    pub ipinfo_token: Option<String>,
    /// HTTP timeout for a single geo lookup, in milliseconds.
    pub geo_http_timeout_ms: u64,

    // ── PgPool settings ─────────────────────────────────────────────────────
    /// Maximum number of connections in the pool (`DB_MAX_CONNECTIONS`, default: 10).
    pub db_max_connections: u32,
    /// Timeout for acquiring a connection from the pool in seconds
    /// (`DB_CONNECT_TIMEOUT`, default: 30).
    pub db_connect_timeout: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let transition_queue_capacity = env::var("TRANSITION_QUEUE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000)
            .max(100);

        let transition_timeout_secs = env::var("TRANSITION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let ipinfo_token = env::var("IPINFO_TOKEN").ok().filter(|t| !t.is_empty());

        let geo_http_timeout_ms = env::var("GEO_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1_500);

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let db_connect_timeout = env::var("DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            database_url,
            log_level,
            log_format,
            transition_queue_capacity,
            transition_timeout_secs,
            ipinfo_token,
            geo_http_timeout_ms,
            db_max_connections,
            db_connect_timeout,
        })
    }
}
