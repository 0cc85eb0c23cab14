//! Error types for the verification pipeline.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) that is
//! included in the Display output and accessible via [`VerityError::code()`].
//! The text shown to the extension comes from [`VerityError::user_message()`],
//! which never includes upstream bodies or internal detail.

use verity_search::SearchError;

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Network, DNS, or connection failure before a response arrived.
    pub const TRANSPORT_FAILURE: &str = "TRANSPORT_FAILURE";

    /// A dependency answered with a non-success HTTP status.
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";

    /// A dependency answered but with nothing usable (zero items, empty text).
    pub const EMPTY_RESULT: &str = "EMPTY_RESULT";

    /// Malformed or missing JSON in a response.
    pub const PARSE_FAILURE: &str = "PARSE_FAILURE";

    /// Missing or invalid configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// The request from the extension was unusable.
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    /// The per-request deadline expired.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// The message channel between bridge and pipeline broke.
    pub const BRIDGE_ERROR: &str = "BRIDGE_ERROR";

    /// Local I/O failure.
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Errors produced by the verification pipeline.
#[derive(Debug, thiserror::Error)]
pub enum VerityError {
    /// Network, DNS, or connection failure.
    #[error("[{}] {}", error_codes::TRANSPORT_FAILURE, .0)]
    Transport(String),

    /// Non-success HTTP status from a dependency.
    #[error("[{}] {service} HTTP {status}: {message}", error_codes::UPSTREAM_ERROR)]
    Upstream {
        /// Which dependency failed (`"search"` or `"llm"`).
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Dependency error message.
        message: String,
    },

    /// A dependency returned nothing usable.
    #[error("[{}] {}", error_codes::EMPTY_RESULT, .0)]
    EmptyResult(String),

    /// Malformed or missing JSON.
    #[error("[{}] {}", error_codes::PARSE_FAILURE, .0)]
    Parse(String),

    /// Missing or invalid configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// The extension sent an unusable request.
    #[error("[{}] {}", error_codes::INVALID_REQUEST, .0)]
    InvalidRequest(String),

    /// The per-request deadline expired.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    Timeout(String),

    /// Bridge channel send/receive error.
    #[error("[{}] {}", error_codes::BRIDGE_ERROR, .0)]
    Bridge(String),

    /// I/O error.
    #[error("[{}] {}", error_codes::IO_ERROR, .0)]
    Io(#[from] std::io::Error),
}

impl VerityError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => error_codes::TRANSPORT_FAILURE,
            Self::Upstream { .. } => error_codes::UPSTREAM_ERROR,
            Self::EmptyResult(_) => error_codes::EMPTY_RESULT,
            Self::Parse(_) => error_codes::PARSE_FAILURE,
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::Timeout(_) => error_codes::TIMEOUT_ERROR,
            Self::Bridge(_) => error_codes::BRIDGE_ERROR,
            Self::Io(_) => error_codes::IO_ERROR,
        }
    }

    /// Short, human-readable text safe to show in the popup.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Network request failed".into(),
            Self::Upstream { .. } => "API request failed".into(),
            Self::EmptyResult(m) | Self::InvalidRequest(m) => m.clone(),
            Self::Parse(_) => "parse failure".into(),
            Self::Timeout(_) => "Request timed out".into(),
            Self::Config(_) | Self::Bridge(_) | Self::Io(_) => "Internal error".into(),
        }
    }
}

impl From<SearchError> for VerityError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Transport(m) => Self::Transport(m),
            SearchError::Upstream { status, message } => Self::Upstream {
                service: "search",
                status,
                message,
            },
            SearchError::EmptyResult(m) => Self::EmptyResult(m),
            SearchError::Parse(m) => Self::Parse(m),
            SearchError::Config(m) => Self::Config(m),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, VerityError>;
