//! Message contract between the browser extension and the host.
//!
//! Request: `{"action": "detectMisinformation", "quote": "..."}`.
//! Response: `{"result": "success", "verdict", "summary", "sources",
//! "biasNotes"}` or `{"result": "error", "message"}`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::pipeline::VerificationReport;
use crate::types::{RankedSource, Verdict};

/// The only action the host understands.
pub const ACTION_DETECT_MISINFORMATION: &str = "detectMisinformation";

/// A request as sent by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub action: String,
    #[serde(default)]
    pub quote: Option<String>,
}

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    DetectMisinformation { quote: String },
}

impl BridgeRequest {
    pub fn detect(quote: impl Into<String>) -> Self {
        Self {
            action: ACTION_DETECT_MISINFORMATION.to_string(),
            quote: Some(quote.into()),
        }
    }

    /// Resolve the action name.
    ///
    /// A missing quote is passed on as empty so the pipeline rejects it
    /// with its usual message.
    ///
    /// # Errors
    ///
    /// [`VerityError::InvalidRequest`] for an unknown action.
    pub fn into_command(self) -> Result<BridgeCommand> {
        match self.action.as_str() {
            ACTION_DETECT_MISINFORMATION => Ok(BridgeCommand::DetectMisinformation {
                quote: self.quote.unwrap_or_default(),
            }),
            other => Err(VerityError::InvalidRequest(format!(
                "unsupported action: {other}"
            ))),
        }
    }
}

/// Decode raw frame bytes into a command.
///
/// # Errors
///
/// [`VerityError::InvalidRequest`] for malformed JSON or an unknown action.
pub fn parse_request(bytes: &[u8]) -> Result<BridgeCommand> {
    let request: BridgeRequest = serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!(error = %e, "malformed bridge request");
        VerityError::InvalidRequest("Malformed request".into())
    })?;
    request.into_command()
}

/// One evidence entry as shown in the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source: String,
    pub rank: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub reasoning: String,
}

impl From<&RankedSource> for SourceEntry {
    fn from(source: &RankedSource) -> Self {
        Self {
            source: source.source_url.clone(),
            rank: source.rank,
            title: source.title.clone(),
            reasoning: source.reasoning.clone(),
        }
    }
}

/// Reply written back to the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum BridgeResponse {
    Success {
        verdict: Verdict,
        summary: String,
        sources: Vec<SourceEntry>,
        #[serde(rename = "biasNotes", default)]
        bias_notes: Vec<String>,
    },
    Error {
        message: String,
    },
}

impl BridgeResponse {
    pub fn from_report(report: &VerificationReport) -> Self {
        Self::Success {
            verdict: report.verdict.verdict,
            summary: report.display_summary().to_string(),
            sources: report
                .verdict
                .supporting_sources
                .iter()
                .map(SourceEntry::from)
                .collect(),
            bias_notes: report.bias_notes.clone(),
        }
    }

    /// Render an error as the short message the popup shows.
    pub fn from_error(err: &VerityError) -> Self {
        Self::error(err.user_message())
    }

    pub fn from_outcome(outcome: Result<VerificationReport>) -> Self {
        match outcome {
            Ok(report) => Self::from_report(&report),
            Err(err) => Self::from_error(&err),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
