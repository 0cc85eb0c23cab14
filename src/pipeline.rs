//! Per-request verification: search fan-out, ranking, optional summary.
//!
//! A request walks `Idle -> Searching -> Aggregating -> Ranking ->
//! (Summarizing) -> Done`, or stops in `Failed`. There are no retry edges.

use std::sync::Arc;

use verity_search::{CustomSearchClient, SearchBackend, SearchQueryConfig, aggregate_detailed};

use crate::bias::scan_bias;
use crate::config::VerityConfig;
use crate::error::{Result, VerityError};
use crate::llm::{CompletionClient, GeminiClient, GeminiConfig};
use crate::ranker::EvidenceRanker;
use crate::summary::SummaryGenerator;
use crate::types::{Quote, VerdictResult};

/// Where a verification request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    Idle,
    Searching,
    Aggregating,
    Ranking,
    Summarizing,
    Done,
    Failed,
}

impl VerificationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Aggregating => "aggregating",
            Self::Ranking => "ranking",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Searching)
                | (Self::Searching, Self::Aggregating)
                | (Self::Searching, Self::Failed)
                | (Self::Aggregating, Self::Ranking)
                | (Self::Aggregating, Self::Done)
                | (Self::Ranking, Self::Summarizing)
                | (Self::Ranking, Self::Done)
                | (Self::Ranking, Self::Failed)
                | (Self::Summarizing, Self::Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one request's stage and logs each transition.
#[derive(Debug)]
struct StageTracker {
    stage: VerificationStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: VerificationStage::Idle,
        }
    }

    fn advance(&mut self, next: VerificationStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        tracing::debug!(from = %self.stage, to = %next, "verification stage");
        self.stage = next;
    }

    fn fail(&mut self, err: VerityError) -> VerityError {
        self.advance(VerificationStage::Failed);
        err
    }
}

/// Everything produced for one quote.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub verdict: VerdictResult,
    /// Text from the summary pass, when it ran and succeeded.
    pub explanation: Option<String>,
    /// Loaded words found in the quote.
    pub bias_notes: Vec<String>,
}

impl VerificationReport {
    /// The text shown under the verdict: the explanation if present,
    /// otherwise the ranking pass's own summary.
    pub fn display_summary(&self) -> &str {
        self.explanation
            .as_deref()
            .unwrap_or(self.verdict.summary.as_str())
    }
}

/// Runs the search, ranking and summary passes for one quote at a time.
pub struct VerificationPipeline<S: SearchBackend> {
    backend: S,
    query_configs: Vec<SearchQueryConfig>,
    ranker: EvidenceRanker,
    summarizer: Option<SummaryGenerator>,
}

impl VerificationPipeline<CustomSearchClient> {
    /// Build the production pipeline from validated configuration.
    ///
    /// # Errors
    ///
    /// [`VerityError::Config`] when either HTTP client cannot be built from
    /// the settings.
    pub fn from_config(config: &VerityConfig) -> Result<Self> {
        let backend = CustomSearchClient::new(config.search_config())?;
        let llm: Arc<dyn CompletionClient> =
            Arc::new(GeminiClient::new(GeminiConfig::from_settings(&config.llm))?);

        let mut pipeline = Self::new(backend, config.query_configs(), EvidenceRanker::new(llm.clone()));
        if config.pipeline.summarize {
            pipeline = pipeline.with_summarizer(SummaryGenerator::new(llm));
        }
        Ok(pipeline)
    }
}

impl<S: SearchBackend> VerificationPipeline<S> {
    pub fn new(backend: S, query_configs: Vec<SearchQueryConfig>, ranker: EvidenceRanker) -> Self {
        Self {
            backend,
            query_configs,
            ranker,
            summarizer: None,
        }
    }

    #[must_use]
    pub fn with_summarizer(mut self, summarizer: SummaryGenerator) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn query_configs(&self) -> &[SearchQueryConfig] {
        &self.query_configs
    }

    /// Verify one raw quote end to end.
    ///
    /// # Errors
    ///
    /// [`VerityError::InvalidRequest`] for a blank quote, the first hard
    /// search failure when no search call succeeded, and any ranking
    /// failure. Summary failures are logged and do not fail the request.
    pub async fn verify(&self, raw_quote: &str) -> Result<VerificationReport> {
        let quote = Quote::new(raw_quote)?;
        let bias_notes = scan_bias(quote.as_str());
        let mut tracker = StageTracker::new();

        tracker.advance(VerificationStage::Searching);
        tracing::trace!(quote = %quote, "searching");
        let report = aggregate_detailed(&self.backend, quote.as_str(), &self.query_configs).await;
        if report.all_failed() {
            if let Some(failure) = report.first_hard_failure() {
                tracing::warn!(
                    failed = report.failures.len(),
                    page = %failure.config,
                    error = %failure.error,
                    "every search call failed"
                );
                return Err(tracker.fail(failure.error.clone().into()));
            }
        }

        tracker.advance(VerificationStage::Aggregating);
        tracing::info!(
            candidates = report.items.len(),
            pages_ok = report.succeeded,
            pages_failed = report.failures.len(),
            "search complete"
        );
        if report.items.is_empty() {
            tracker.advance(VerificationStage::Done);
            return Ok(VerificationReport {
                verdict: VerdictResult::no_evidence(&quote),
                explanation: None,
                bias_notes,
            });
        }

        tracker.advance(VerificationStage::Ranking);
        let verdict = match self.ranker.rank(&quote, &report.items).await {
            Ok(verdict) => verdict,
            Err(err) => return Err(tracker.fail(err)),
        };

        let explanation = match &self.summarizer {
            Some(summarizer) => {
                tracker.advance(VerificationStage::Summarizing);
                match summarizer.summarize(&quote, &verdict).await {
                    Ok(text) => Some(text),
                    Err(err) => {
                        tracing::warn!(error = %err, "summary pass failed; using ranking summary");
                        None
                    }
                }
            }
            None => None,
        };

        tracker.advance(VerificationStage::Done);
        Ok(VerificationReport {
            verdict,
            explanation,
            bias_notes,
        })
    }
}

impl<S: SearchBackend> std::fmt::Debug for VerificationPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationPipeline")
            .field("backend", &self.backend.name())
            .field("query_configs", &self.query_configs.len())
            .field("ranker", &self.ranker)
            .field("summarize", &self.summarizer.is_some())
            .finish()
    }
}
