//! Data models for the environmental monitor pipeline.

use serde::{Deserialize, Serialize};

// ---

/// Raw reading as stored in the remote database, one per record ID.
///
/// The store has two deployment variants for the time field: `datetime`
/// (ISO-8601 string) or `time` (elapsed milliseconds since device boot).
/// Both are optional at the serde layer; the active time policy decides
/// which one is required during normalization. `time` stays an untyped
/// JSON value here because some firmware revisions write it as a string.
#[derive(Debug, Deserialize)]
pub struct RawReading {
    // ---
    pub temp: f64,
    pub hum: f64,
    pub ldr: f64,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub time: Option<serde_json::Value>,
}

/// Normalized reading served to the dashboard shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    // ---
    /// Sort key in milliseconds: Unix epoch millis under the datetime
    /// policy, the device's raw elapsed counter under the elapsed policy.
    pub time_ms: i64,
    /// Chart axis label: the stored timestamp string, or `HH:MM:SS`
    /// derived from the elapsed counter.
    pub time_display: String,
    pub temp: f64,
    pub hum: f64,
    pub ldr: f64,
}

// ---

/// Format a device elapsed-time counter as zero-padded `HH:MM:SS`.
///
/// Hours do not wrap at 24: a device up for a day reads `25:13:08`.
pub fn format_elapsed_ms(ms: u64) -> String {
    // ---
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
