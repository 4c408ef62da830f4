//! Question answering endpoint.
//!
//! `POST /ask` runs the full relay pass: fetch live sensor aggregates
//! (best effort), fall back to the sample analysis when the store had
//! nothing, compose the prompt, and return the generated answer.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::models::{SensorAnalysis, SAMPLE_SENSOR_DATA};
use crate::prompt::{self, Language};
use crate::store::TimeWindow;
use crate::{Config, GeminiClient, SensorStore};

// ---

pub fn router() -> Router<(SensorStore, GeminiClient, Config)> {
    // ---
    Router::new().route("/ask", post(handler))
}

/// Request body for `POST /ask`. An empty question is allowed; the
/// language is optional and resolves to English when absent or unknown.
#[derive(Debug, Deserialize)]
struct QuestionRequest {
    // ---
    question: String,
    #[serde(default)]
    language: Option<String>,
}

async fn handler(
    State((store, gemini, config)): State<(SensorStore, GeminiClient, Config)>,
    body: String,
) -> impl IntoResponse {
    // ---
    // The body is parsed by hand so a validation failure can echo the
    // original payload back alongside the parse error.
    let request: QuestionRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("POST /ask - invalid request body: {}", e);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": e.to_string(), "body": body })),
            )
                .into_response();
        }
    };

    let language = Language::parse(request.language.as_deref());
    info!("POST /ask - language {:?}, question: {}", language, request.question);

    // Step 1: live aggregates; any store failure yields an empty map
    let window = TimeWindow::parse(&config.sensor_window);
    let aggregates = store.fetch_aggregates(window).await;

    // Step 2: choose the prompt context
    let context = sensor_context(aggregates);

    // Step 3: compose and generate
    let prompt = prompt::compose(&request.question, &context, language);

    match gemini.generate(&prompt).await {
        Ok(answer) => (StatusCode::OK, Json(json!({ "answer": answer }))).into_response(),
        Err(e) => {
            error!("Question processing error: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Failed to process question" })),
            )
                .into_response()
        }
    }
}

// ---

/// Prompt context: live aggregates when present, otherwise the fixture
/// analysis with the five most recent raw readings attached for reference.
fn sensor_context(aggregates: Map<String, Value>) -> Value {
    // ---
    if !aggregates.is_empty() {
        return Value::Object(aggregates);
    }

    info!("No sensor data available from database. Using sample data.");

    let analysis = SensorAnalysis::from_readings(&SAMPLE_SENSOR_DATA, chrono::Utc::now());
    let mut context = serde_json::to_value(&analysis).unwrap_or_else(|_| json!({}));

    if let Value::Object(ref mut map) = context {
        let tail = &SAMPLE_SENSOR_DATA[SAMPLE_SENSOR_DATA.len() - 5..];
        map.insert(
            "raw_readings".to_string(),
            serde_json::to_value(tail).unwrap_or_else(|_| json!([])),
        );
    }

    context
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_live_aggregates_pass_through() {
        // ---
        let mut aggregates = Map::new();
        aggregates.insert("avg_temperature".to_string(), json!(39.91));
        aggregates.insert("latest_reading".to_string(), json!("2025-03-26T18:45:00Z"));

        let context = sensor_context(aggregates);
        assert_eq!(context["avg_temperature"], json!(39.91));
        assert!(context.get("sample_data").is_none());
        assert!(context.get("raw_readings").is_none());
    }

    #[test]
    fn test_empty_aggregates_fall_back_to_sample_analysis() {
        // ---
        let context = sensor_context(Map::new());

        assert_eq!(context["sample_data"], json!(true));
        assert_eq!(context["total_records"], json!(20));
        assert_eq!(context["moisture_condition"], json!("moderate"));

        // Last five fixture readings, in order
        let raw = context["raw_readings"].as_array().unwrap();
        assert_eq!(raw.len(), 5);
        assert_eq!(raw[0]["ID"], json!(16));
        assert_eq!(raw[4]["ID"], json!(20));
    }

    #[test]
    fn test_question_request_accepts_missing_language() {
        // ---
        let request: QuestionRequest = serde_json::from_str(r#"{"question": ""}"#).unwrap();
        assert_eq!(request.question, "");
        assert!(request.language.is_none());
    }

    #[test]
    fn test_question_request_rejects_missing_question() {
        // ---
        assert!(serde_json::from_str::<QuestionRequest>(r#"{"language": "hindi"}"#).is_err());
    }
}
