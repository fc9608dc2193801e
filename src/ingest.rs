//! Ingestion pipeline: remote fetch plus normalization.
//!
//! One pass per refresh tick: GET the full readings object from the
//! store, turn every entry into a typed [`Reading`], order the result
//! by time, and keep only the most recent records. Nothing is retained
//! between passes; given an unchanged store snapshot the output is
//! identical.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{format_elapsed_ms, Config, IngestError, RawReading, Reading, TimePolicy};

// ---

/// Run one full ingestion pass against the remote store.
pub async fn fetch_and_normalize(
    client: &Client,
    config: &Config,
) -> Result<Vec<Reading>, IngestError> {
    // ---
    let raw = fetch_readings(client, &config.db_url).await?;
    normalize(raw, config.time_policy, config.max_display_records)
}

/// Fetch the raw readings object from the store.
///
/// The store keeps every reading under a single JSON object keyed by
/// record ID. A null body (empty store) is an empty map, not an error.
async fn fetch_readings(
    client: &Client,
    db_url: &str,
) -> Result<BTreeMap<String, Value>, IngestError> {
    // ---
    let url = format!("{}/readings.json", db_url);
    debug!("Fetching readings from: {}", url);

    let body: Option<BTreeMap<String, Value>> = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let raw = body.unwrap_or_default();
    debug!("Store returned {} raw records", raw.len());
    Ok(raw)
}

/// Normalize a raw readings map into a bounded, time-ordered series.
///
/// Record IDs carry no ordering guarantee, so everything is re-sorted by
/// the extracted time key. The map iterates in ID order and the sort is
/// stable, which pins records sharing a time key to ID order.
pub fn normalize(
    raw: BTreeMap<String, Value>,
    policy: TimePolicy,
    max_records: usize,
) -> Result<Vec<Reading>, IngestError> {
    // ---
    let mut readings = Vec::with_capacity(raw.len());

    for (id, value) in raw {
        let record: RawReading =
            serde_json::from_value(value).map_err(|e| IngestError::Malformed {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        readings.push(normalize_record(&id, record, policy)?);
    }

    readings.sort_by_key(|r| r.time_ms);

    // Keep only the chronologically last records
    let excess = readings.len().saturating_sub(max_records);
    if excess > 0 {
        debug!("Dropping {} oldest records past the display cap", excess);
        readings.drain(..excess);
    }

    Ok(readings)
}

fn normalize_record(
    id: &str,
    raw: RawReading,
    policy: TimePolicy,
) -> Result<Reading, IngestError> {
    // ---
    let (time_ms, time_display) = match policy {
        TimePolicy::Datetime => {
            let text = raw
                .datetime
                .as_deref()
                .ok_or_else(|| IngestError::Malformed {
                    id: id.to_string(),
                    reason: "missing datetime field".to_string(),
                })?;
            let instant = parse_datetime(text).ok_or_else(|| IngestError::Malformed {
                id: id.to_string(),
                reason: format!("unparsable datetime {:?}", text),
            })?;
            (instant.timestamp_millis(), text.to_string())
        }
        TimePolicy::ElapsedMs => {
            let value = raw.time.as_ref().ok_or_else(|| IngestError::Malformed {
                id: id.to_string(),
                reason: "missing time field".to_string(),
            })?;
            let ms = match coerce_elapsed_ms(value) {
                Some(ms) => ms,
                None => {
                    // Compatibility with the deployed firmware: a time
                    // value that fails coercion becomes 0, which sorts
                    // that record to the front of the series.
                    warn!("Record {} has non-numeric time {:?}, treating as 0", id, value);
                    0
                }
            };
            (ms as i64, format_elapsed_ms(ms))
        }
    };

    Ok(Reading {
        time_ms,
        time_display,
        temp: raw.temp,
        hum: raw.hum,
        ldr: raw.ldr,
    })
}

/// Parse the store's datetime strings.
///
/// Device firmware writes naive `YYYY-MM-DD HH:MM:SS` stamps; RFC 3339
/// is tried first for deployments that log with an offset. Naive stamps
/// are taken as UTC.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    // ---
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Coerce a JSON time value to a millisecond counter.
///
/// The counter is non-negative; fractional values floor, negative and
/// non-numeric values fail coercion.
fn coerce_elapsed_ms(value: &Value) -> Option<u64> {
    // ---
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn counter_entry(time: Value, temp: f64) -> Value {
        // ---
        json!({ "temp": temp, "hum": 50.0, "ldr": 40.0, "time": time })
    }

    fn raw_map(entries: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
        // ---
        entries
            .into_iter()
            .map(|(id, v)| (id.to_string(), v))
            .collect()
    }

    #[test]
    fn test_empty_store_yields_empty_series() {
        // ---
        let series = normalize(BTreeMap::new(), TimePolicy::ElapsedMs, 15).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_sorts_ascending_regardless_of_id_order() {
        // ---
        let raw = raw_map(vec![
            ("-z-last-id", counter_entry(json!(1_000), 20.0)),
            ("-a-first-id", counter_entry(json!(3_000), 22.0)),
            ("-m-middle-id", counter_entry(json!(2_000), 21.0)),
        ]);

        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        let times: Vec<i64> = series.iter().map(|r| r.time_ms).collect();
        assert_eq!(times, vec![1_000, 2_000, 3_000]);
        assert_eq!(series[0].temp, 20.0);
    }

    #[test]
    fn test_caps_series_by_dropping_oldest() {
        // ---
        let raw: BTreeMap<String, Value> = (0..20)
            .map(|i| {
                (
                    format!("rec-{:02}", i),
                    counter_entry(json!(i * 1_000), 20.0),
                )
            })
            .collect();

        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        assert_eq!(series.len(), 15);
        // The 5 chronologically earliest entries are gone
        assert_eq!(series.first().unwrap().time_ms, 5_000);
        assert_eq!(series.last().unwrap().time_ms, 19_000);
    }

    #[test]
    fn test_cap_larger_than_store_keeps_everything() {
        // ---
        let raw = raw_map(vec![
            ("a", counter_entry(json!(1_000), 20.0)),
            ("b", counter_entry(json!(2_000), 21.0)),
        ]);
        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_equal_times_keep_record_id_order() {
        // ---
        let raw = raw_map(vec![
            ("b-second", counter_entry(json!(5_000), 2.0)),
            ("a-first", counter_entry(json!(5_000), 1.0)),
            ("c-third", counter_entry(json!(5_000), 3.0)),
        ]);

        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        let temps: Vec<f64> = series.iter().map(|r| r.temp).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_elapsed_display_is_formatted() {
        // ---
        let raw = raw_map(vec![("a", counter_entry(json!(3_725_000), 20.0))]);
        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        assert_eq!(series[0].time_display, "01:02:05");
    }

    #[test]
    fn test_string_counter_is_accepted() {
        // ---
        let raw = raw_map(vec![("a", counter_entry(json!("42000"), 20.0))]);
        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        assert_eq!(series[0].time_ms, 42_000);
    }

    #[test]
    fn test_unparsable_counter_becomes_zero_and_sorts_first() {
        // ---
        let raw = raw_map(vec![
            ("a-garbage", counter_entry(json!("not-a-number"), 99.0)),
            ("b-real", counter_entry(json!(10_000), 20.0)),
        ]);

        let series = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        assert_eq!(series[0].time_ms, 0);
        assert_eq!(series[0].temp, 99.0);
        assert_eq!(series[0].time_display, "00:00:00");
        assert_eq!(series[1].time_ms, 10_000);
    }

    #[test]
    fn test_missing_time_field_is_malformed() {
        // ---
        let raw = raw_map(vec![(
            "a",
            json!({ "temp": 20.0, "hum": 50.0, "ldr": 40.0 }),
        )]);
        let err = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_missing_measurement_is_malformed() {
        // ---
        let raw = raw_map(vec![(
            "a",
            json!({ "temp": 20.0, "ldr": 40.0, "time": 1_000 }),
        )]);
        let err = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }

    #[test]
    fn test_datetime_policy_orders_by_parsed_instant() {
        // ---
        let raw = raw_map(vec![
            (
                "a",
                json!({ "temp": 21.0, "hum": 50.0, "ldr": 40.0,
                        "datetime": "2025-05-02 10:16:00" }),
            ),
            (
                "b",
                json!({ "temp": 20.0, "hum": 50.0, "ldr": 40.0,
                        "datetime": "2025-05-02T10:15:00" }),
            ),
        ]);

        let series = normalize(raw, TimePolicy::Datetime, 15).unwrap();
        assert_eq!(series[0].temp, 20.0);
        assert_eq!(series[1].temp, 21.0);
        // Raw timestamp string carried through for display
        assert_eq!(series[0].time_display, "2025-05-02T10:15:00");
    }

    #[test]
    fn test_datetime_policy_accepts_rfc3339_offsets() {
        // ---
        let raw = raw_map(vec![(
            "a",
            json!({ "temp": 20.0, "hum": 50.0, "ldr": 40.0,
                    "datetime": "2025-05-02T10:15:00+02:00" }),
        )]);

        let series = normalize(raw, TimePolicy::Datetime, 15).unwrap();
        // 10:15 at +02:00 is 08:15 UTC
        assert_eq!(series[0].time_ms, 1_746_173_700_000);
    }

    #[test]
    fn test_unparsable_datetime_is_malformed() {
        // ---
        let raw = raw_map(vec![(
            "a",
            json!({ "temp": 20.0, "hum": 50.0, "ldr": 40.0, "datetime": "yesterday" }),
        )]);
        let err = normalize(raw, TimePolicy::Datetime, 15).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }

    #[test]
    fn test_normalize_is_idempotent_for_a_snapshot() {
        // ---
        let raw = raw_map(vec![
            ("a", counter_entry(json!(3_000), 22.0)),
            ("b", counter_entry(json!(1_000), 20.0)),
            ("c", counter_entry(json!(2_000), 21.0)),
        ]);

        let first = normalize(raw.clone(), TimePolicy::ElapsedMs, 15).unwrap();
        let second = normalize(raw, TimePolicy::ElapsedMs, 15).unwrap();
        assert_eq!(first, second);
    }
}
