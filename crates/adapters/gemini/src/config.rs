//! Gemini adapter configuration.

use serde::Deserialize;

/// Configuration for the Gemini suggestion generator.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key. Suggestions fail with "not configured" while unset.
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-2.0-flash-lite`.
    pub model: String,
    /// Base URL of the API, without a trailing path.
    pub endpoint: String,
    /// Whole-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash-lite".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

// The key must never end up in logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    /// URL of the `generateContent` method for the configured model.
    #[must_use]
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}
