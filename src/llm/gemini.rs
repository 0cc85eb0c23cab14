//! Gemini `generateContent` adapter.
//!
//! Request: `POST {base_url}/v1beta/models/{model}:generateContent?key=…`
//! with `{"contents": [{"role": "user", "parts": [{"text": prompt}]}]}`.
//! Reply text is the concatenation of `candidates[0].content.parts[].text`.

use async_trait::async_trait;
use std::time::Duration;

use super::CompletionClient;
use crate::error::{Result, VerityError};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

// ── Configuration ──────────────────────────────────────────────

/// Configuration for the Gemini adapter.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter.
    pub api_key: String,
    /// Base URL for the API (defaults to [`DEFAULT_BASE_URL`]).
    pub base_url: String,
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// HTTP timeout for one completion call.
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Create a new Gemini config.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            timeout_seconds: 30,
        }
    }

    /// Set the base URL (useful for testing with mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Build from the `[llm]` section of the host config.
    pub fn from_settings(settings: &crate::config::LlmSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.model.clone())
            .with_base_url(settings.base_url.clone())
            .with_timeout_seconds(settings.timeout_seconds)
    }
}

// ── Request / response shapes ──────────────────────────────────

/// Build a `generateContent` request body holding one user turn.
pub fn build_generate_request(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": prompt}],
        }],
    })
}

/// Concatenate the text parts of the first candidate.
///
/// Returns an empty string when the shape is missing; the caller decides
/// whether that is an error.
pub fn extract_candidate_text(body: &serde_json::Value) -> String {
    body.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Extract an error message from a Gemini error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

// ── Client ─────────────────────────────────────────────────────

/// Gemini completion client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`VerityError::Config`] when the API key is blank and
    /// [`VerityError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VerityError::Config("llm api_key must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| VerityError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.model)
        )
    }

    /// Map an HTTP error status to the matching [`VerityError`].
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> VerityError {
        VerityError::Upstream {
            service: "llm",
            status: status.as_u16(),
            message: extract_error_message(body),
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending completion request");

        // `without_url` keeps the API key out of error messages.
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&build_generate_request(prompt))
            .send()
            .await
            .map_err(|e| {
                VerityError::Transport(format!("LLM request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            VerityError::Transport(format!("LLM response read failed: {}", e.without_url()))
        })?;

        if !status.is_success() {
            let err = Self::map_http_error(status, &body);
            tracing::warn!(model = %self.config.model, error = %err, "completion request rejected");
            return Err(err);
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| VerityError::Parse(format!("invalid LLM response body: {e}")))?;

        let text = extract_candidate_text(&value);
        if text.trim().is_empty() {
            tracing::warn!(model = %self.config.model, "completion returned no text");
            return Err(VerityError::EmptyResult("No text returned from model".into()));
        }

        tracing::debug!(model = %self.config.model, reply_chars = text.len(), "completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
