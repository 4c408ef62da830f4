//! Prompt composition for the generation service.
//!
//! A single template embeds the role framing, the serialized sensor
//! context (live aggregates or the fallback analysis), the user's
//! question, the static agronomy guidance rules, and a language
//! directive. Unrecognized language codes fall back to English so a bad
//! code never fails a request.

use serde_json::Value;

// ---

/// Response languages supported by the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Tamil,
    Telugu,
    Malayalam,
    Punjabi,
    Marathi,
    Kannada,
}

impl Language {
    /// Resolve a request language code. Case-insensitive; anything
    /// unrecognized (or absent) resolves to English.
    pub fn parse(code: Option<&str>) -> Self {
        // ---
        match code.map(|c| c.to_ascii_lowercase()).as_deref() {
            Some("hindi") => Language::Hindi,
            Some("tamil") => Language::Tamil,
            Some("telugu") => Language::Telugu,
            Some("malayalam") => Language::Malayalam,
            Some("punjabi") => Language::Punjabi,
            Some("marathi") => Language::Marathi,
            Some("kannada") => Language::Kannada,
            _ => Language::English,
        }
    }

    /// The instruction appended to the prompt for this language.
    pub fn directive(self) -> &'static str {
        // ---
        match self {
            Language::English => "Respond in English.",
            Language::Hindi => "Respond in Hindi (हिन्दी).",
            Language::Tamil => "Respond in Tamil (தமிழ்).",
            Language::Telugu => "Respond in Telugu (తెలుగు).",
            Language::Malayalam => "Respond in Malayalam (മലയാളം).",
            Language::Punjabi => "Respond in Punjabi (ਪੰਜਾਬੀ).",
            Language::Marathi => "Respond in Marathi (मराठी).",
            Language::Kannada => "Respond in Kannada (ಕನ್ನಡ).",
        }
    }
}

// ---

/// Render the full prompt sent to the generation service.
pub fn compose(question: &str, sensor_context: &Value, language: Language) -> String {
    // ---
    let context_json =
        serde_json::to_string_pretty(sensor_context).unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are an agricultural AI assistant. Provide helpful, informative, and practical \
         advice about farming, agriculture, and related topics.\n\
         \n\
         Sensor Data Context:\n\
         {context_json}\n\
         \n\
         Question: {question}\n\
         \n\
         Guidelines:\n\
         - Give clear, concise, and actionable responses.\n\
         - Use the provided sensor data context to inform your answers.\n\
         - Provide specific insights based on temperature, humidity, and moisture readings.\n\
         - Consider the trends in the data to make recommendations.\n\
         - If the soil moisture is low (< 20%), suggest irrigation may be needed.\n\
         - If temperature is trending high with low moisture, warn about potential drought stress.\n\
         - If humidity is high (> 85%) with high moisture, mention potential fungal disease risk.\n\
         - Support your answers with practical insights from the data.\n\
         - {directive}\n",
        directive = language.directive(),
    )
}
