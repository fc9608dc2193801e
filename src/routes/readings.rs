use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::{alerts, ingest, Alert, Config, IngestError, Reading};

// ---

/// Shown instead of charts when the store has no readings yet.
const NO_DATA_BANNER: &str = "No data available. Check if your sensor is connected?";
/// Shown when the latest reading passed every threshold check.
const ALL_CLEAR_BANNER: &str = "All readings are within normal thresholds.";

pub fn router() -> Router<(Client, Config)> {
    // ---
    Router::new().route("/readings", get(handler))
}

/// Result of one refresh tick, consumed by the dashboard shell.
#[derive(Debug, Serialize)]
struct ReadingsResponse {
    // ---
    /// Normalized series, ascending by time, at most the configured cap.
    readings: Vec<Reading>,
    /// Out-of-range checks against the latest reading, error-styled by
    /// the shell.
    alerts: Vec<Alert>,
    /// Status banner when there are no alerts to show: the no-data
    /// warning or the all-clear message. Absent while alerts are firing.
    banner: Option<String>,
    shown: usize,
    last_updated: DateTime<Utc>,
}

async fn handler(State((client, config)): State<(Client, Config)>) -> impl IntoResponse {
    // ---
    info!("GET /readings - starting refresh tick");

    // Step 1: one fetch-and-normalize pass against the store
    let readings = match ingest::fetch_and_normalize(&client, &config).await {
        Ok(readings) => readings,
        Err(e) => {
            error!("Refresh tick failed: {}", e);
            let status = match e {
                IngestError::Fetch(_) => StatusCode::BAD_GATEWAY,
                IngestError::Malformed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return (status, Json(e.to_string())).into_response();
        }
    };

    // Step 2: evaluate thresholds against the latest reading
    let alerts = alerts::evaluate(&readings, &config);
    debug!(
        "Tick complete: {} readings, {} alerts",
        readings.len(),
        alerts.len()
    );

    let banner = if readings.is_empty() {
        Some(NO_DATA_BANNER.to_string())
    } else if alerts.is_empty() {
        Some(ALL_CLEAR_BANNER.to_string())
    } else {
        None
    };

    let shown = readings.len();
    let response = ReadingsResponse {
        readings,
        alerts,
        banner,
        shown,
        last_updated: Utc::now(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
