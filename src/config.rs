//! Configuration loader for the `envmon-backend` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// How a raw record's time field is interpreted.
///
/// The store's deployments differ only here: older firmware writes an
/// ISO-8601 `datetime` string, newer firmware an elapsed millisecond
/// counter under `time`. One pipeline handles both, selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePolicy {
    /// `datetime` field, ISO-8601 string, sorted by the parsed instant.
    Datetime,
    /// `time` field, milliseconds since device boot, sorted by the raw
    /// counter and displayed as `HH:MM:SS`.
    ElapsedMs,
}

impl TimePolicy {
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            TimePolicy::Datetime => "datetime",
            TimePolicy::ElapsedMs => "elapsed_ms",
        }
    }
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Base URL of the remote readings store (no trailing slash).
    pub db_url: String,

    /// Alert fires when the latest temperature exceeds this (°C).
    pub temp_threshold: f64,

    /// Alert fires when the latest humidity exceeds this (%).
    pub hum_threshold: f64,

    /// Alert fires when the latest light level drops below this (%).
    pub ldr_threshold: f64,

    /// Most recent readings kept after sorting; older ones are dropped.
    pub max_display_records: usize,

    /// Cadence the dashboard shell should poll `/readings` at.
    pub refresh_interval_ms: u32,

    /// Upper bound on one fetch from the store.
    pub fetch_timeout_secs: u64,

    /// Active interpretation of the raw time field.
    pub time_policy: TimePolicy,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DB_URL` – base URL of the remote readings store
///
/// Optional:
/// - `TEMP_THRESHOLD` – temperature alert threshold in °C (default: 30)
/// - `HUM_THRESHOLD` – humidity alert threshold in % (default: 75)
/// - `LDR_THRESHOLD` – light alert threshold in % (default: 10)
/// - `MAX_DISPLAY_RECORDS` – readings retained per tick (default: 15)
/// - `REFRESH_INTERVAL_MS` – shell polling cadence (default: 3000)
/// - `FETCH_TIMEOUT_SECS` – store request timeout (default: 10)
/// - `TIME_POLICY` – `datetime` or `elapsed_ms` (default: `datetime`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DB_URL").trim_end_matches('/').to_string();
    let temp_threshold = parse_env!("TEMP_THRESHOLD", f64, 30.0);
    let hum_threshold = parse_env!("HUM_THRESHOLD", f64, 75.0);
    let ldr_threshold = parse_env!("LDR_THRESHOLD", f64, 10.0);
    let max_display_records = parse_env!("MAX_DISPLAY_RECORDS", usize, 15);
    let refresh_interval_ms = parse_env!("REFRESH_INTERVAL_MS", u32, 3000);
    let fetch_timeout_secs = parse_env!("FETCH_TIMEOUT_SECS", u64, 10);

    let time_policy = match env::var("TIME_POLICY").ok().as_deref() {
        None | Some("datetime") => TimePolicy::Datetime,
        Some("elapsed_ms") => TimePolicy::ElapsedMs,
        Some(other) => {
            return Err(anyhow!(
                "Invalid TIME_POLICY: {} (expected \"datetime\" or \"elapsed_ms\")",
                other
            ))
        }
    };

    Ok(Config {
        db_url,
        temp_threshold,
        hum_threshold,
        ldr_threshold,
        max_display_records,
        refresh_interval_ms,
        fetch_timeout_secs,
        time_policy,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DB_URL              : {}", self.db_url);
        tracing::info!("  TEMP_THRESHOLD      : {}", self.temp_threshold);
        tracing::info!("  HUM_THRESHOLD       : {}", self.hum_threshold);
        tracing::info!("  LDR_THRESHOLD       : {}", self.ldr_threshold);
        tracing::info!("  MAX_DISPLAY_RECORDS : {}", self.max_display_records);
        tracing::info!("  REFRESH_INTERVAL_MS : {}", self.refresh_interval_ms);
        tracing::info!("  FETCH_TIMEOUT_SECS  : {}", self.fetch_timeout_secs);
        tracing::info!("  TIME_POLICY         : {}", self.time_policy.as_str());
    }
}
