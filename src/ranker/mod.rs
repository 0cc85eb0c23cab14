//! Evidence ranking: one completion call that judges the quote against the
//! aggregated candidates and returns a verdict with ordered sources.

pub mod parse;
pub mod prompt;

use std::sync::Arc;

use verity_search::SourceItem;

use crate::error::Result;
use crate::llm::CompletionClient;
use crate::types::{Quote, VerdictResult};

pub use parse::{extract_json_object, parse_ranking_response};
pub use prompt::{SOCIAL_MEDIA_DOMAINS, build_ranking_prompt};

/// Ranks candidate sources for a quote with a completion model.
#[derive(Clone)]
pub struct EvidenceRanker {
    client: Arc<dyn CompletionClient>,
}

impl EvidenceRanker {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Judge `quote` against `candidates`.
    ///
    /// With no candidates the model is not called and the neutral
    /// "Unverifiable" result is returned.
    ///
    /// # Errors
    ///
    /// Propagates completion failures unchanged and returns
    /// [`crate::VerityError::Parse`] when the reply cannot be decoded.
    pub async fn rank(&self, quote: &Quote, candidates: &[SourceItem]) -> Result<VerdictResult> {
        if candidates.is_empty() {
            tracing::info!("no candidate sources; skipping ranking");
            return Ok(VerdictResult::no_evidence(quote));
        }

        let prompt = build_ranking_prompt(quote, candidates);
        tracing::debug!(
            backend = self.client.name(),
            candidates = candidates.len(),
            "ranking evidence"
        );
        let reply = self.client.complete(&prompt).await?;
        let result = parse_ranking_response(&reply)?;
        tracing::info!(
            verdict = %result.verdict,
            sources = result.supporting_sources.len(),
            "ranking complete"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for EvidenceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceRanker")
            .field("client", &self.client.name())
            .finish()
    }
}
