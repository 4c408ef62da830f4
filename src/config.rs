//! Configuration loader for the `agriedge-backend` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase, improving
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u16 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u16>())
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

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Gemini generation API key.
    pub gemini_api_key: String,

    /// Gemini API base URL.
    pub gemini_api_url: String,

    /// Gemini model used for text generation.
    pub gemini_model: String,

    /// Supabase project base URL.
    pub supabase_url: String,

    /// Supabase access key (service or anon).
    pub supabase_key: String,

    /// Aggregation window token for store queries ("24h", "7d", "30d").
    pub sensor_window: String,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// Timeout for outbound HTTP calls, in seconds.
    pub http_timeout_secs: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `GEMINI_API_KEY` – generation API key
/// - `SUPABASE_URL` – Supabase project base URL
/// - `SUPABASE_KEY` – Supabase access key
///
/// Optional:
/// - `GEMINI_API_URL` – Gemini API base URL (default: hosted v1beta endpoint)
/// - `GEMINI_MODEL` – generation model (default: `gemini-2.0-flash`)
/// - `SENSOR_WINDOW` – aggregation window token (default: `24h`)
/// - `PORT` – listen port (default: 8000)
/// - `HTTP_TIMEOUT_SECS` – outbound call timeout (default: 30)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let gemini_api_key = require_env!("GEMINI_API_KEY");
    let supabase_url = require_env!("SUPABASE_URL");
    let supabase_key = require_env!("SUPABASE_KEY");

    let gemini_api_url = env::var("GEMINI_API_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
    let gemini_model =
        env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
    let sensor_window = env::var("SENSOR_WINDOW").unwrap_or_else(|_| "24h".to_string());

    let port = parse_env_u16!("PORT", 8000);
    let http_timeout_secs = parse_env_u16!("HTTP_TIMEOUT_SECS", 30);

    Ok(Config {
        gemini_api_key,
        gemini_api_url,
        gemini_model,
        supabase_url,
        supabase_key,
        sensor_window,
        port,
        http_timeout_secs,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks secrets (API keys) while showing all configuration values
    /// that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  GEMINI_API_KEY    : {}", mask_secret(&self.gemini_api_key));
        tracing::info!("  GEMINI_API_URL    : {}", self.gemini_api_url);
        tracing::info!("  GEMINI_MODEL      : {}", self.gemini_model);
        tracing::info!("  SUPABASE_URL      : {}", self.supabase_url);
        tracing::info!("  SUPABASE_KEY      : {}", mask_secret(&self.supabase_key));
        tracing::info!("  SENSOR_WINDOW     : {}", self.sensor_window);
        tracing::info!("  PORT              : {}", self.port);
        tracing::info!("  HTTP_TIMEOUT_SECS : {}", self.http_timeout_secs);
    }
}

/// Mask all but the first four characters of a secret.
fn mask_secret(secret: &str) -> String {
    // ---
    if secret.len() > 4 {
        format!("{}****", &secret[..4])
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_mask_secret_keeps_prefix() {
        // ---
        assert_eq!(mask_secret("AIzaSyExample"), "AIza****");
    }

    #[test]
    fn test_mask_secret_short_values() {
        // ---
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
