//! Search-provider connection settings.
//!
//! [`SearchConfig`] holds the credentials and transport settings shared by
//! every call. Per-call parameters (engine, page size, offset) live in
//! [`crate::SearchQueryConfig`].

use crate::error::SearchError;

/// Default base URL of the Custom Search JSON API.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Largest page the provider serves in one call.
pub const MAX_PAGE_SIZE: u32 = 10;

/// Connection settings for the search provider.
#[derive(Clone)]
pub struct SearchConfig {
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Provider base URL. Overridable for tests.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, the crate's own agent string is used.
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 8,
            user_agent: None,
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

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `api_key` must not be blank
    /// - `timeout_seconds` must be greater than 0
    /// - `base_url` must parse as an absolute http(s) URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Config("api_key must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::Config(format!(
                "base_url must be http or https, got {}",
                parsed.scheme()
            )));
        }
        Ok(())
    }
}
