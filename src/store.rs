//! Sensor aggregate fetcher backed by the hosted Supabase store.
//!
//! The store is owned and written by the field data producer; this
//! service only reads time-windowed aggregates through the PostgREST
//! surface. Any failure here is recovered locally by returning an empty
//! context so a store outage never fails an `/ask` request.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::round2;
use crate::Config;

// ---

/// Aggregation window for store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Last24Hours,
    Last7Days,
    Last30Days,
}

impl TimeWindow {
    /// Resolve a window token. Unknown tokens resolve to the 24-hour
    /// default, matching the lenient handling of language codes.
    pub fn parse(token: &str) -> Self {
        // ---
        match token {
            "7d" => TimeWindow::Last7Days,
            "30d" => TimeWindow::Last30Days,
            _ => TimeWindow::Last24Hours,
        }
    }

    fn duration(self) -> chrono::Duration {
        // ---
        match self {
            TimeWindow::Last24Hours => chrono::Duration::hours(24),
            TimeWindow::Last7Days => chrono::Duration::days(7),
            TimeWindow::Last30Days => chrono::Duration::days(30),
        }
    }
}

// ---

/// PostgREST aggregate select list: server-side averages over the window
/// plus the newest insertion timestamp.
const SELECT_AGGREGATES: &str = "avg_temperature:temperature.avg(),\
     avg_humidity:humidity.avg(),\
     avg_moisture:moisture.avg(),\
     latest_reading:inserted_at.max()";

/// Read-only client for the `sensordata` table.
#[derive(Debug, Clone)]
pub struct SensorStore {
    // ---
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SensorStore {
    /// Build a store client from configuration. The reqwest client is
    /// constructed once and reused for all requests.
    pub fn new(cfg: &Config) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs as u64))
            .build()
            .context("Failed to build Supabase HTTP client")?;

        Ok(SensorStore {
            http,
            base_url: cfg.supabase_url.trim_end_matches('/').to_string(),
            api_key: cfg.supabase_key.clone(),
        })
    }

    /// Fetch rounded sensor aggregates for the given window.
    ///
    /// Never fails: an empty result set, a null average, or any
    /// transport/store error is logged and mapped to an empty object so
    /// the caller can fall back to the sample dataset.
    pub async fn fetch_aggregates(&self, window: TimeWindow) -> Map<String, Value> {
        // ---
        match self.query_aggregates(window).await {
            Ok(aggregates) if aggregates.is_empty() => {
                warn!("No sensor data found for {:?}, falling back to sample data", window);
                Map::new()
            }
            Ok(aggregates) => {
                debug!("Fetched sensor aggregates: {:?}", aggregates);
                aggregates
            }
            Err(e) => {
                warn!("Error fetching sensor data: {e:#}");
                Map::new()
            }
        }
    }

    async fn query_aggregates(&self, window: TimeWindow) -> Result<Map<String, Value>> {
        // ---
        let cutoff = (Utc::now() - window.duration()).to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = format!("{}/rest/v1/sensordata", self.base_url);
        let window_filter = format!("gte.{cutoff}");

        debug!("Querying sensor aggregates since {}", cutoff);

        let rows: Vec<Map<String, Value>> = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", SELECT_AGGREGATES),
                ("inserted_at", window_filter.as_str()),
            ])
            .send()
            .await
            .context("Supabase request failed")?
            .error_for_status()
            .context("Supabase returned an error status")?
            .json()
            .await
            .context("Failed to parse Supabase response")?;

        Ok(reduce_rows(rows))
    }
}

// ---

/// Reduce the aggregate query result to a rounded context object.
///
/// PostgREST returns a single-row array for an aggregate select. A
/// missing row or a null `avg_temperature` means the window held no
/// readings; both map to an empty object.
fn reduce_rows(mut rows: Vec<Map<String, Value>>) -> Map<String, Value> {
    // ---
    let Some(row) = rows.pop() else {
        return Map::new();
    };

    match row.get("avg_temperature") {
        Some(v) if !v.is_null() => {}
        _ => return Map::new(),
    }

    row.into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v.as_f64() {
            Some(f) => (k, Value::from(round2(f))),
            None => (k, v),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Vec<Map<String, Value>> {
        // ---
        match value {
            Value::Object(map) => vec![map],
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_reduce_rows_rounds_aggregates() {
        // ---
        let rows = row(json!({
            "avg_temperature": 39.90499,
            "avg_humidity": 82.31999,
            "avg_moisture": 45.7695,
            "latest_reading": "2025-03-26T18:45:00Z",
        }));

        let reduced = reduce_rows(rows);
        assert_eq!(reduced["avg_temperature"], json!(39.9));
        assert_eq!(reduced["avg_humidity"], json!(82.32));
        assert_eq!(reduced["avg_moisture"], json!(45.77));
        assert_eq!(reduced["latest_reading"], json!("2025-03-26T18:45:00Z"));
    }

    #[test]
    fn test_reduce_rows_empty_result() {
        // ---
        assert!(reduce_rows(Vec::new()).is_empty());
    }

    #[test]
    fn test_reduce_rows_null_average_means_no_data() {
        // ---
        let rows = row(json!({
            "avg_temperature": null,
            "avg_humidity": null,
            "avg_moisture": null,
            "latest_reading": null,
        }));

        assert!(reduce_rows(rows).is_empty());
    }

    #[test]
    fn test_reduce_rows_drops_null_fields() {
        // ---
        let rows = row(json!({
            "avg_temperature": 40.0,
            "avg_humidity": 80.0,
            "avg_moisture": null,
            "latest_reading": "2025-03-26T18:45:00Z",
        }));

        let reduced = reduce_rows(rows);
        assert!(!reduced.contains_key("avg_moisture"));
        assert_eq!(reduced["avg_temperature"], json!(40.0));
    }

    #[test]
    fn test_time_window_parse() {
        // ---
        assert_eq!(TimeWindow::parse("24h"), TimeWindow::Last24Hours);
        assert_eq!(TimeWindow::parse("7d"), TimeWindow::Last7Days);
        assert_eq!(TimeWindow::parse("30d"), TimeWindow::Last30Days);
        assert_eq!(TimeWindow::parse("1y"), TimeWindow::Last24Hours);
        assert_eq!(TimeWindow::default(), TimeWindow::Last24Hours);
    }
}
