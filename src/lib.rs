//! Verity: quote verification for a browser extension.
//!
//! A quote selected in the browser is checked in four steps:
//! search → aggregate → rank → (summarize).
//!
//! # Architecture
//!
//! - **Search**: `verity-search` queries the Custom Search API across
//!   engines and page windows concurrently and merges the results
//! - **Ranking**: one LLM call judges the quote against the candidates and
//!   returns a verdict with up to ten ranked sources
//! - **Summary**: an optional second LLM call writes the explanation shown
//!   to the reader
//! - **Bridge**: the native-messaging host the extension talks to over
//!   stdin/stdout

pub mod bias;
pub mod bridge;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod ranker;
pub mod summary;
pub mod types;

pub use bridge::{BridgeRequest, BridgeResponse, Framing};
pub use config::VerityConfig;
pub use error::{Result, VerityError};
pub use llm::{CompletionClient, GeminiClient, GeminiConfig};
pub use pipeline::{VerificationPipeline, VerificationReport, VerificationStage};
pub use ranker::EvidenceRanker;
pub use summary::SummaryGenerator;
pub use types::{Quote, RankedSource, Verdict, VerdictResult};
