//! Programmable Search (Custom Search JSON API) client.
//!
//! One call is one `GET /customsearch/v1` with `key`, `cx`, `q`, `num` and
//! an optional 1-indexed `start`. The provider returns at most ten items
//! per call, so deeper result sets are fetched as several page windows
//! (see [`crate::orchestrator::pagination`]).

use serde::Deserialize;

use crate::config::SearchConfig;
use crate::engine::SearchBackend;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchQueryConfig, SourceItem};

/// HTTP client for the Custom Search JSON API.
#[derive(Debug, Clone)]
pub struct CustomSearchClient {
    config: SearchConfig,
    client: reqwest::Client,
}

impl CustomSearchClient {
    /// Create a client from validated connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid settings or
    /// [`SearchError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/customsearch/v1",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl SearchBackend for CustomSearchClient {
    async fn search(
        &self,
        query: &str,
        config: &SearchQueryConfig,
    ) -> Result<Vec<SourceItem>, SearchError> {
        tracing::trace!(query, page = %config, "custom search");

        let mut params: Vec<(&str, String)> = vec![
            ("key", self.config.api_key.clone()),
            ("cx", config.engine_id.clone()),
            ("q", query.to_string()),
            ("num", config.page_size.to_string()),
        ];
        if let Some(start) = config.start_offset {
            params.push(("start", start.to_string()));
        }

        // `without_url` keeps the API key out of error messages.
        let response = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                SearchError::Transport(format!("search request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SearchError::Transport(format!("search response read failed: {}", e.without_url()))
        })?;

        if !status.is_success() {
            let message = extract_error_message(&body);
            tracing::warn!(page = %config, status = status.as_u16(), %message, "search provider returned an error");
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let page = parse_response(&body)?;
        tracing::debug!(
            page = %config,
            count = page.items.len(),
            total_results = page.total_results,
            "search page received"
        );
        Ok(page.items)
    }

    fn name(&self) -> &'static str {
        "custom-search"
    }
}

/// A decoded provider page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Items carrying a usable link, in provider order.
    pub items: Vec<SourceItem>,
    /// `searchInformation.totalResults`, when present and numeric.
    pub total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

/// Decode a provider response body.
///
/// Kept separate from the HTTP call so it can be tested with fixed JSON.
///
/// # Errors
///
/// [`SearchError::Parse`] for an undecodable body and
/// [`SearchError::EmptyResult`] when no item with a link remains.
pub fn parse_response(body: &str) -> Result<SearchPage, SearchError> {
    let decoded: CustomSearchResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid search response: {e}")))?;

    let total_results = decoded
        .search_information
        .and_then(|info| info.total_results)
        .and_then(|raw| raw.parse::<u64>().ok());

    let items: Vec<SourceItem> = decoded
        .items
        .into_iter()
        .filter(|item| !item.link.trim().is_empty())
        .map(|item| SourceItem {
            url: item.link,
            title: item.title.trim().to_string(),
            snippet: item.snippet.trim().to_string(),
        })
        .collect();

    if items.is_empty() {
        return Err(SearchError::no_results());
    }

    Ok(SearchPage {
        items,
        total_results,
    })
}

/// Extract `error.message` from a provider error body, falling back to the raw body.
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

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_RESPONSE: &str = r#"{
        "searchInformation": {"totalResults": "1230"},
        "items": [
            {"link": "https://www.reuters.com/fact-check/moon", "title": "Fact Check: Moon landing", "snippet": "Reuters examined the claim."},
            {"link": "https://www.nasa.gov/apollo", "title": "Apollo 11 ", "snippet": " NASA mission page "},
            {"title": "No link here", "snippet": "dropped"}
        ]
    }"#;

    #[test]
    fn parse_mock_response_returns_items() {
        let page = parse_response(MOCK_RESPONSE).expect("should parse");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].url, "https://www.reuters.com/fact-check/moon");
        assert_eq!(page.items[0].title, "Fact Check: Moon landing");
        assert_eq!(page.items[1].title, "Apollo 11");
        assert_eq!(page.items[1].snippet, "NASA mission page");
        assert_eq!(page.total_results, Some(1230));
    }

    #[test]
    fn missing_items_is_empty_result() {
        let err = parse_response(r#"{"searchInformation": {"totalResults": "0"}}"#).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn empty_items_array_is_empty_result() {
        let err = parse_response(r#"{"items": []}"#).unwrap_err();
        assert!(err.is_empty_result());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_response("<html>oops</html>").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn non_numeric_total_is_ignored() {
        let body = r#"{"searchInformation": {"totalResults": "many"}, "items": [{"link": "https://a.com"}]}"#;
        let page = parse_response(body).expect("should parse");
        assert_eq!(page.total_results, None);
        assert_eq!(page.items[0].title, "");
    }

    #[test]
    fn error_message_prefers_provider_message() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid."}}"#;
        assert_eq!(extract_error_message(body), "API key not valid.");
        assert_eq!(extract_error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = SearchConfig::new("key").with_base_url("http://localhost:9999/");
        let client = CustomSearchClient::new(config).expect("client");
        assert_eq!(client.endpoint(), "http://localhost:9999/customsearch/v1");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = CustomSearchClient::new(SearchConfig::new("")).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CustomSearchClient>();
    }

    #[tokio::test]
    #[ignore] // Live test: needs VERITY_SEARCH_API_KEY and VERITY_SEARCH_ENGINE_ID_BROAD
    async fn live_custom_search() {
        let key = std::env::var("VERITY_SEARCH_API_KEY").expect("api key");
        let cx = std::env::var("VERITY_SEARCH_ENGINE_ID_BROAD").expect("engine id");
        let client = CustomSearchClient::new(SearchConfig::new(key)).expect("client");
        let results = client
            .search("rust programming language", &SearchQueryConfig::new(cx, 5))
            .await
            .expect("live search should work");
        assert!(!results.is_empty());
    }
}
