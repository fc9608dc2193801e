//! Dashboard descriptor endpoint.
//!
//! The shell owns chart rendering and the refresh cadence; this route
//! hands it everything needed to wire both up: one descriptor per chart
//! (field, axis label, threshold reference line, trace color), the
//! polling interval, the record cap, and the active time policy.

use axum::{extract::State, routing::get, Json, Router};
use reqwest::Client;
use serde::Serialize;

use crate::Config;

// ---

/// One time-series chart: which field to plot and how.
#[derive(Debug, Serialize)]
struct ChartSpec {
    // ---
    field: &'static str,
    label: &'static str,
    /// Horizontal reference line drawn at this value.
    threshold: f64,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    // ---
    charts: [ChartSpec; 3],
    refresh_interval_ms: u32,
    max_display_records: usize,
    time_policy: &'static str,
}

async fn handler(State((_, config)): State<(Client, Config)>) -> Json<DashboardResponse> {
    // ---
    Json(DashboardResponse {
        charts: [
            ChartSpec {
                field: "temp",
                label: "Temperature (°C)",
                threshold: config.temp_threshold,
                color: "red",
            },
            ChartSpec {
                field: "hum",
                label: "Humidity (%)",
                threshold: config.hum_threshold,
                color: "blue",
            },
            ChartSpec {
                field: "ldr",
                label: "Light (%)",
                threshold: config.ldr_threshold,
                color: "green",
            },
        ],
        refresh_interval_ms: config.refresh_interval_ms,
        max_display_records: config.max_display_records,
        time_policy: config.time_policy.as_str(),
    })
}

pub fn router() -> Router<(Client, Config)> {
    // ---
    Router::new().route("/dashboard", get(handler))
}
