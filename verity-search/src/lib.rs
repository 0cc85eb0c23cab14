//! # verity-search
//!
//! Candidate-source retrieval for Verity.
//!
//! This crate queries a programmable web-search API for pages related to a
//! quote and merges the answers of several engine configurations and page
//! windows into one flat candidate list.
//!
//! ## Design
//!
//! - One HTTP GET per (engine, page window); zero items is an error value,
//!   not an empty success
//! - All calls of a request run concurrently and are joined before merging
//! - Failed pages are dropped; the rest still count
//! - No deduplication and no scoring: credibility ranking happens downstream
//!
//! ## Security
//!
//! - The API key never appears in error messages or `Debug` output
//! - Query text is logged only at trace level

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod types;

pub use config::SearchConfig;
pub use engine::SearchBackend;
pub use engines::CustomSearchClient;
pub use error::{Result, SearchError};
pub use orchestrator::fanout::{AggregateReport, PageFailure, aggregate, aggregate_detailed};
pub use orchestrator::pagination::page_windows;
pub use types::{SearchQueryConfig, SourceItem};

/// Run a single query against the Custom Search API.
///
/// Convenience wrapper that builds a [`CustomSearchClient`] for one call.
/// Long-lived callers should build the client once and reuse it.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for invalid settings, and otherwise the
/// same errors as [`SearchBackend::search`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> verity_search::Result<()> {
/// let config = verity_search::SearchConfig::new("api-key");
/// let page = verity_search::SearchQueryConfig::new("engine-id", 10);
/// let items = verity_search::search("the moon landing was faked", &page, &config).await?;
/// for item in &items {
///     println!("{}: {}", item.title, item.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    page: &SearchQueryConfig,
    config: &SearchConfig,
) -> Result<Vec<SourceItem>> {
    let client = CustomSearchClient::new(config.clone())?;
    client.search(query, page).await
}
