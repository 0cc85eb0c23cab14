//! Error types for the verity-search crate.
//!
//! All errors use stable string messages suitable for logging and
//! programmatic handling. API keys never appear in error messages.

/// Errors that can occur while querying the search provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success HTTP status.
    #[error("upstream HTTP {status}: {message}")]
    Upstream {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Provider error message, or the raw body when none was supplied.
        message: String,
    },

    /// The provider answered successfully but returned no items.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Failed to decode the provider's response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// The canonical "zero items" outcome.
    pub fn no_results() -> Self {
        Self::EmptyResult("No results found".into())
    }

    /// Returns true if the page was reachable but had nothing in it.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }
}

/// Convenience type alias for verity-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
