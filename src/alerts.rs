//! Threshold alert evaluation.
//!
//! Alerts are derived, never stored: every refresh tick re-evaluates the
//! most recent reading against the fixed thresholds, so a standing
//! condition re-raises its alert each tick until it clears. There is no
//! hysteresis and no suppression across ticks.

use serde::Serialize;

use crate::{Config, Reading};

// ---

/// Which threshold fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TempHigh,
    HumHigh,
    LightLow,
}

/// A banner-ready alert for one out-of-range measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    // ---
    pub kind: AlertKind,
    pub value: f64,
    pub text: String,
}

/// Evaluate alert thresholds against the most recent reading.
///
/// Only the last element of the series is inspected; an empty series
/// yields no alerts. The three checks are independent and run in fixed
/// order: temperature, humidity, light.
pub fn evaluate(series: &[Reading], config: &Config) -> Vec<Alert> {
    // ---
    let Some(latest) = series.last() else {
        return Vec::new();
    };

    let mut alerts = Vec::new();

    if latest.temp > config.temp_threshold {
        alerts.push(Alert {
            kind: AlertKind::TempHigh,
            value: latest.temp,
            text: format!("Temperature high: {}°C", latest.temp),
        });
    }
    if latest.hum > config.hum_threshold {
        alerts.push(Alert {
            kind: AlertKind::HumHigh,
            value: latest.hum,
            text: format!("Humidity high: {}%", latest.hum),
        });
    }
    if latest.ldr < config.ldr_threshold {
        alerts.push(Alert {
            kind: AlertKind::LightLow,
            value: latest.ldr,
            text: format!("Light low: {}%", latest.ldr),
        });
    }

    alerts
}
