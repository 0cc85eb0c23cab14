//! Trait definition for pluggable search backends.
//!
//! The aggregator only talks to [`SearchBackend`], so the HTTP client in
//! [`crate::engines`] can be swapped for an in-memory fake in tests.

use crate::error::SearchError;
use crate::types::{SearchQueryConfig, SourceItem};

/// A search provider that answers one paginated query at a time.
///
/// Each backend handles its own:
///
/// - URL construction with query encoding
/// - HTTP request with appropriate parameters
/// - Response decoding into [`SourceItem`]s
/// - Mapping transport, status and empty-page conditions to [`SearchError`]
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait SearchBackend: Send + Sync {
    /// Run one query against one engine/page window.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyResult`] when the page holds zero items;
    /// any other failure maps to the matching [`SearchError`] variant.
    fn search(
        &self,
        query: &str,
        config: &SearchQueryConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SourceItem>, SearchError>> + Send;

    /// Short backend name used in log fields.
    fn name(&self) -> &'static str;
}
