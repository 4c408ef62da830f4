//! Sample dataset endpoint.
//!
//! `GET /sample-data` exposes the fallback fixture together with its
//! computed analysis so the dashboard can render the demo view without
//! live sensors.

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::models::{SensorAnalysis, SensorReading, SAMPLE_SENSOR_DATA};

// ---

/// JSON response body for the `/sample-data` endpoint.
#[derive(Serialize)]
struct SampleDataResponse {
    sample_data: &'static [SensorReading],
    analysis: SensorAnalysis,
}

async fn sample_data() -> Json<SampleDataResponse> {
    // ---
    Json(SampleDataResponse {
        sample_data: &SAMPLE_SENSOR_DATA,
        analysis: SensorAnalysis::from_readings(&SAMPLE_SENSOR_DATA, Utc::now()),
    })
}

/// Create a subrouter containing the `/sample-data` route. Generic over
/// the application state so it merges cleanly with the gateway router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/sample-data", get(sample_data))
}
