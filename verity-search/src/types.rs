//! Core types for search requests and candidate sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate source returned by the search provider.
///
/// Two items refer to the same source when their `url`s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// The URL of the result page.
    pub url: String,
    /// The title of the result page.
    pub title: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
}

impl SourceItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// Parameters for a single search-provider call.
///
/// Several configs usually target the same query: one per engine, or one
/// per pagination window of the same engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQueryConfig {
    /// Programmable search engine identifier (`cx`).
    pub engine_id: String,
    /// Number of results requested (`num`).
    pub page_size: u32,
    /// 1-indexed offset of the first result (`start`). Omitted when `None`.
    pub start_offset: Option<u32>,
}

impl SearchQueryConfig {
    pub fn new(engine_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            engine_id: engine_id.into(),
            page_size,
            start_offset: None,
        }
    }

    #[must_use]
    pub fn with_start_offset(mut self, start: u32) -> Self {
        self.start_offset = Some(start);
        self
    }
}

impl fmt::Display for SearchQueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start_offset {
            Some(start) => write!(f, "{}[{}+{}]", self.engine_id, start, self.page_size),
            None => write!(f, "{}[{}]", self.engine_id, self.page_size),
        }
    }
}
