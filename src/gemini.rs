//! Gemini text-generation client.
//!
//! Thin wrapper over the `generateContent` REST endpoint. Unlike the
//! store client, failures here are propagated: a request without an
//! answer is a failed request.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Config;

// ---

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

// ---

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    // ---
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a generation client from configuration.
    pub fn new(cfg: &Config) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs as u64))
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(GeminiClient {
            http,
            base_url: cfg.gemini_api_url.trim_end_matches('/').to_string(),
            model: cfg.gemini_model.clone(),
            api_key: cfg.gemini_api_key.clone(),
        })
    }

    /// Send a prompt and return the generated text.
    ///
    /// Errors on transport failure, a non-success status, or a response
    /// with no usable text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        // ---
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        info!("Calling Gemini model {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .http
            .post(&url)
            // The key travels in a header, not the URL, so it never lands in logs
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Gemini returned error {status}: {error_text}");
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let Some(text) = extract_text(body) else {
            bail!("Gemini response contained no text");
        };

        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }
}

// ---

/// Pull the first candidate's text out of a response; `None` when the
/// response carries no non-empty text.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    // ---
    response
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .find(|t| !t.is_empty())
}
