//! End-to-end verification against mocked search and LLM providers.
//!
//! Both providers are wiremock servers; the pipeline is built from a
//! `VerityConfig` exactly as the host binary builds it, and results are
//! rendered through the bridge contract the extension sees.

use serde_json::json;
use verity::bridge::BridgeResponse;
use verity::config::VerityConfig;
use verity::types::NO_EVIDENCE_SUMMARY;
use verity::{VerificationPipeline, Verdict};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUOTE: &str = "The Great Wall of China is visible from space";
const SEARCH_PATH: &str = "/customsearch/v1";
const LLM_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

struct Providers {
    search: MockServer,
    llm: MockServer,
}

impl Providers {
    async fn start() -> Self {
        Self {
            search: MockServer::start().await,
            llm: MockServer::start().await,
        }
    }

    fn config(&self, summarize: bool) -> VerityConfig {
        let mut config = VerityConfig::default();
        config.search.api_key = "search-key".into();
        config.search.engine_id_specific = "specific".into();
        config.search.engine_id_broad = "broad".into();
        config.search.base_url = self.search.uri();
        config.llm.api_key = "llm-key".into();
        config.llm.base_url = self.llm.uri();
        config.pipeline.summarize = summarize;
        config.validate().expect("test config is valid");
        config
    }

    async fn verify(&self, summarize: bool) -> BridgeResponse {
        let pipeline = VerificationPipeline::from_config(&self.config(summarize)).expect("pipeline");
        BridgeResponse::from_outcome(pipeline.verify(QUOTE).await)
    }

    async fn mount_page(&self, engine: &str, start: u32, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("cx", engine))
            .and(query_param("start", start.to_string()))
            .and(query_param("q", QUOTE))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.search)
            .await;
    }

    async fn mount_llm(&self, marker: &str, response: ResponseTemplate, calls: u64) {
        Mock::given(method("POST"))
            .and(path(LLM_PATH))
            .and(body_string_contains(marker))
            .respond_with(response)
            .expect(calls)
            .mount(&self.llm)
            .await;
    }
}

fn page(prefix: &str, n: usize) -> serde_json::Value {
    let items: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "link": format!("https://{prefix}.example/{i}"),
                "title": format!("{prefix} {i}"),
                "snippet": format!("snippet {i}"),
            })
        })
        .collect();
    json!({"searchInformation": {"totalResults": "15"}, "items": items})
}

fn empty_page() -> serde_json::Value {
    json!({"searchInformation": {"totalResults": "0"}})
}

fn gemini_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }))
}

fn ranking_reply() -> String {
    let sources: Vec<_> = (1..=5)
        .map(|rank| {
            json!({
                "rank": rank,
                "sourceUrl": format!("https://news.example/{}", rank - 1),
                "title": format!("news {}", rank - 1),
                "reasoning": "Directly addresses the claim"
            })
        })
        .collect();
    let body = json!({
        "quoteClaim": "The Great Wall can be seen with the naked eye from orbit",
        "finalVerdict": {"verdict": "False", "summary": "Astronauts report it is not visible."},
        "supportingSources": sources,
    });
    format!("Here is my analysis:\n```json\n{body}\n```")
}

#[tokio::test]
async fn empty_search_returns_no_evidence_without_llm_call() {
    let providers = Providers::start().await;
    providers.mount_page("specific", 1, empty_page()).await;
    providers.mount_page("specific", 11, empty_page()).await;
    providers.mount_page("broad", 1, empty_page()).await;
    providers
        .mount_llm("", gemini_text("unused"), 0)
        .await;

    let response = providers.verify(true).await;
    assert_eq!(
        response,
        BridgeResponse::Success {
            verdict: Verdict::Unverifiable,
            summary: NO_EVIDENCE_SUMMARY.to_string(),
            sources: Vec::new(),
            bias_notes: Vec::new(),
        }
    );
}

#[tokio::test]
async fn fifteen_candidates_rank_into_five_sources() {
    let providers = Providers::start().await;
    providers.mount_page("specific", 1, page("news", 10)).await;
    providers.mount_page("specific", 11, empty_page()).await;
    providers.mount_page("broad", 1, page("wide", 5)).await;
    providers
        .mount_llm("CANDIDATE SOURCES (15)", gemini_text(&ranking_reply()), 1)
        .await;

    let response = providers.verify(false).await;
    let BridgeResponse::Success {
        verdict,
        summary,
        sources,
        ..
    } = response
    else {
        panic!("expected success, got {response:?}");
    };
    assert_eq!(verdict, Verdict::False);
    assert_eq!(summary, "Astronauts report it is not visible.");
    let ranks: Vec<u8> = sources.iter().map(|s| s.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    assert_eq!(sources[0].source, "https://news.example/0");

    let requests = providers.llm.received_requests().await.expect("recording enabled");
    let prompt = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(prompt.contains("https://news.example/9"));
    assert!(prompt.contains("https://wide.example/4"));
    let first_broad = prompt.find("https://wide.example/0").expect("broad item in prompt");
    let last_specific = prompt.find("https://news.example/9").expect("specific item in prompt");
    assert!(last_specific < first_broad, "specific results come before broad ones");
}

#[tokio::test]
async fn llm_rate_limit_becomes_api_request_failed() {
    let providers = Providers::start().await;
    providers.mount_page("specific", 1, page("news", 3)).await;
    providers.mount_page("specific", 11, empty_page()).await;
    providers.mount_page("broad", 1, page("wide", 2)).await;
    providers
        .mount_llm(
            "CANDIDATE SOURCES",
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": {"code": 429, "message": "Resource has been exhausted"}})),
            1,
        )
        .await;

    let response = providers.verify(true).await;
    assert_eq!(response, BridgeResponse::error("API request failed"));
}

#[tokio::test]
async fn failing_search_provider_fails_the_request() {
    let providers = Providers::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid"}
        })))
        .expect(3)
        .mount(&providers.search)
        .await;
    providers.mount_llm("", gemini_text("unused"), 0).await;

    let response = providers.verify(true).await;
    assert_eq!(response, BridgeResponse::error("API request failed"));
}

#[tokio::test]
async fn summary_pass_supplies_displayed_summary() {
    let providers = Providers::start().await;
    providers.mount_page("specific", 1, page("news", 6)).await;
    providers.mount_page("specific", 11, empty_page()).await;
    providers.mount_page("broad", 1, empty_page()).await;
    providers
        .mount_llm("CANDIDATE SOURCES", gemini_text(&ranking_reply()), 1)
        .await;
    providers
        .mount_llm(
            "ANALYST NOTES",
            gemini_text("  False. The wall is too narrow to see from orbit.  "),
            1,
        )
        .await;

    let response = providers.verify(true).await;
    let BridgeResponse::Success { summary, .. } = response else {
        panic!("expected success, got {response:?}");
    };
    assert_eq!(summary, "False. The wall is too narrow to see from orbit.");
}

#[tokio::test]
async fn unparseable_ranking_reply_is_parse_failure() {
    let providers = Providers::start().await;
    providers.mount_page("specific", 1, page("news", 2)).await;
    providers.mount_page("specific", 11, empty_page()).await;
    providers.mount_page("broad", 1, empty_page()).await;
    providers
        .mount_llm(
            "CANDIDATE SOURCES",
            gemini_text("I am unable to assess this claim."),
            1,
        )
        .await;

    let response = providers.verify(false).await;
    assert_eq!(response, BridgeResponse::error("parse failure"));
}
