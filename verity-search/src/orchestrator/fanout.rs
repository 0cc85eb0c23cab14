//! Concurrent fan-out / fan-in over a fixed set of search calls.
//!
//! Every call is started at once and joined with
//! [`futures::future::join_all`]; nothing is cancelled when a call fails.
//! Items from successful calls are concatenated in config order, then
//! page order. Duplicate URLs across engines are kept: choosing between
//! them is the ranking pass's job.

use crate::engine::SearchBackend;
use crate::error::SearchError;
use crate::types::{SearchQueryConfig, SourceItem};

/// One call that did not contribute items.
#[derive(Debug, Clone)]
pub struct PageFailure {
    /// The call parameters.
    pub config: SearchQueryConfig,
    /// Why it failed.
    pub error: SearchError,
}

/// Detailed outcome of a fan-out.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    /// Items of every successful call, flattened.
    pub items: Vec<SourceItem>,
    /// Number of calls that succeeded.
    pub succeeded: usize,
    /// Calls that failed, in config order.
    pub failures: Vec<PageFailure>,
}

impl AggregateReport {
    /// True when at least one call was made and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.succeeded == 0 && !self.failures.is_empty()
    }

    /// The first failure that is not a plain empty page, if any.
    pub fn first_hard_failure(&self) -> Option<&PageFailure> {
        self.failures.iter().find(|f| !f.error.is_empty_result())
    }
}

/// Run every call concurrently and collect whichever succeeded.
///
/// # Pipeline
///
/// 1. Start one `backend.search` per config
/// 2. Wait for all of them to settle
/// 3. Keep successful item lists, flattened in config order
/// 4. Record failures (empty pages at debug level, others at warn)
pub async fn aggregate_detailed<B: SearchBackend>(
    backend: &B,
    query: &str,
    configs: &[SearchQueryConfig],
) -> AggregateReport {
    let futures: Vec<_> = configs
        .iter()
        .map(|config| async move {
            let outcome = backend.search(query, config).await;
            (config, outcome)
        })
        .collect();

    let outcomes = futures::future::join_all(futures).await;

    let mut report = AggregateReport::default();
    for (config, outcome) in outcomes {
        match outcome {
            Ok(items) => {
                tracing::debug!(backend = backend.name(), page = %config, count = items.len(), "page succeeded");
                report.succeeded += 1;
                report.items.extend(items);
            }
            Err(error) => {
                if error.is_empty_result() {
                    tracing::debug!(backend = backend.name(), page = %config, "page had no results");
                } else {
                    tracing::warn!(backend = backend.name(), page = %config, error = %error, "page failed");
                }
                report.failures.push(PageFailure {
                    config: config.clone(),
                    error,
                });
            }
        }
    }

    tracing::debug!(
        calls = configs.len(),
        succeeded = report.succeeded,
        items = report.items.len(),
        "fan-out complete"
    );
    report
}

/// Run every call concurrently and return the flattened items of the successful ones.
///
/// An empty vector is a valid outcome: every call failed or was empty.
pub async fn aggregate<B: SearchBackend>(
    backend: &B,
    query: &str,
    configs: &[SearchQueryConfig],
) -> Vec<SourceItem> {
    aggregate_detailed(backend, query, configs).await.items
}
