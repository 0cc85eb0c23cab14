//! Request-scoped domain types: the quote, verdicts and ranked evidence.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VerityError};

/// Upper bound on ranked supporting sources.
pub const MAX_SUPPORTING_SOURCES: usize = 10;

/// Summary used when no candidate sources were found.
pub const NO_EVIDENCE_SUMMARY: &str = "No evidence found for this quote.";

/// The user-submitted claim being checked. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quote(String);

impl Quote {
    /// Trim and wrap raw input.
    ///
    /// # Errors
    ///
    /// Returns [`VerityError::InvalidRequest`] when nothing but whitespace remains.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(VerityError::InvalidRequest("Please enter a quote".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The six fixed fact-check labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Factual")]
    Factual,
    #[serde(rename = "Mostly Factual")]
    MostlyFactual,
    #[serde(rename = "Misleading/Lacks Context")]
    MisleadingLacksContext,
    #[serde(rename = "Mostly False")]
    MostlyFalse,
    #[serde(rename = "False")]
    False,
    #[serde(rename = "Unverifiable")]
    Unverifiable,
}

impl Verdict {
    /// Display label, also the literal the model is asked to emit.
    pub fn label(self) -> &'static str {
        match self {
            Self::Factual => "Factual",
            Self::MostlyFactual => "Mostly Factual",
            Self::MisleadingLacksContext => "Misleading/Lacks Context",
            Self::MostlyFalse => "Mostly False",
            Self::False => "False",
            Self::Unverifiable => "Unverifiable",
        }
    }

    /// All labels, best-supported first.
    pub fn all() -> &'static [Verdict] {
        &[
            Self::Factual,
            Self::MostlyFactual,
            Self::MisleadingLacksContext,
            Self::MostlyFalse,
            Self::False,
            Self::Unverifiable,
        ]
    }

    /// Match a label ignoring case, whitespace and punctuation.
    ///
    /// `"Mostly Factual"`, `"MOSTLY_FACTUAL"` and `"MostlyFactual"` all map to
    /// [`Verdict::MostlyFactual`]. Anything else is `None`.
    pub fn from_label(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::all()
            .iter()
            .copied()
            .find(|v| {
                let candidate: String = v
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                candidate == key
            })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One piece of evidence chosen by the ranking pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSource {
    /// Display position, 1 = best. Contiguous from 1 within a result, at most 10.
    pub rank: u8,
    pub source_url: String,
    pub title: Option<String>,
    /// Why the model considered this source relevant and credible.
    pub reasoning: String,
}

/// Verdict plus ordered evidence for one quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictResult {
    /// The falsifiable claim as restated by the model.
    pub quote_claim: String,
    pub verdict: Verdict,
    pub summary: String,
    /// Rank ascending, at most [`MAX_SUPPORTING_SOURCES`] entries.
    pub supporting_sources: Vec<RankedSource>,
}

impl VerdictResult {
    /// The neutral result returned when there was nothing to rank.
    pub fn no_evidence(quote: &Quote) -> Self {
        Self {
            quote_claim: quote.as_str().to_string(),
            verdict: Verdict::Unverifiable,
            summary: NO_EVIDENCE_SUMMARY.to_string(),
            supporting_sources: Vec::new(),
        }
    }

    pub fn has_evidence(&self) -> bool {
        !self.supporting_sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_is_trimmed() {
        let quote = Quote::new("  the moon landing was faked \n").expect("valid");
        assert_eq!(quote.as_str(), "the moon landing was faked");
        assert_eq!(quote.to_string(), "the moon landing was faked");
    }

    #[test]
    fn blank_quote_rejected() {
        let err = Quote::new(" \t ").unwrap_err();
        assert_eq!(err.user_message(), "Please enter a quote");
    }

    #[test]
    fn verdict_labels_round_trip_through_from_label() {
        for verdict in Verdict::all() {
            assert_eq!(Verdict::from_label(verdict.label()), Some(*verdict));
        }
    }

    #[test]
    fn verdict_from_label_is_lenient_about_formatting() {
        assert_eq!(Verdict::from_label("MostlyFactual"), Some(Verdict::MostlyFactual));
        assert_eq!(Verdict::from_label("mostly_false"), Some(Verdict::MostlyFalse));
        assert_eq!(
            Verdict::from_label("Misleading / Lacks Context"),
            Some(Verdict::MisleadingLacksContext)
        );
        assert_eq!(Verdict::from_label(" FALSE "), Some(Verdict::False));
    }

    #[test]
    fn unknown_verdict_label_is_none() {
        assert_eq!(Verdict::from_label("Partly True"), None);
        assert_eq!(Verdict::from_label(""), None);
    }

    #[test]
    fn verdict_serializes_as_label() {
        let json = serde_json::to_string(&Verdict::MisleadingLacksContext).expect("serialize");
        assert_eq!(json, "\"Misleading/Lacks Context\"");
    }

    #[test]
    fn no_evidence_result_is_neutral() {
        let quote = Quote::new("cats are allergic to peanuts").expect("valid");
        let result = VerdictResult::no_evidence(&quote);
        assert_eq!(result.verdict, Verdict::Unverifiable);
        assert_eq!(result.summary, NO_EVIDENCE_SUMMARY);
        assert_eq!(result.quote_claim, "cats are allergic to peanuts");
        assert!(!result.has_evidence());
    }
}
