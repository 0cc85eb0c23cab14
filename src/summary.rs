//! Optional second completion pass that turns a verdict into a short,
//! readable explanation.

use std::sync::Arc;

use crate::error::{Result, VerityError};
use crate::llm::CompletionClient;
use crate::types::{Quote, VerdictResult};

/// Number of ranked sources quoted back to the model.
const SUMMARY_SOURCE_LIMIT: usize = 3;

/// Word limit requested from the model.
const SUMMARY_WORD_LIMIT: usize = 200;

/// Build the explanation prompt for an already-decided verdict.
pub fn build_summary_prompt(quote: &Quote, result: &VerdictResult) -> String {
    let mut prompt = format!(
        "You are a neutral fact-check writer. Explain the verdict below to a general reader.\n\n\
         QUOTE: \"{}\"\nVERDICT: {}\nANALYST NOTES: {}\n",
        quote.as_str(),
        result.verdict.label(),
        result.summary
    );

    if result.has_evidence() {
        prompt.push_str("\nSOURCES (rely only on these):\n");
        for source in result.supporting_sources.iter().take(SUMMARY_SOURCE_LIMIT) {
            let title = source.title.as_deref().unwrap_or("Untitled");
            prompt.push_str(&format!("- {title} ({})\n", source.source_url));
        }
    }

    prompt.push_str(&format!(
        "\nINSTRUCTIONS:\n\
         - Start by stating the verdict.\n\
         - Use at most {SUMMARY_WORD_LIMIT} words.\n\
         - Stay unbiased: no persuasive, sensational, or loaded words.\n\
         - Write naturally, as a person would; avoid lists, headings, and boilerplate.\n\
         - Reply with the explanation text only.\n"
    ));

    prompt
}

/// Generates the explanation shown under the verdict.
#[derive(Clone)]
pub struct SummaryGenerator {
    client: Arc<dyn CompletionClient>,
}

impl SummaryGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Produce an explanation for `result`.
    ///
    /// # Errors
    ///
    /// Completion failures propagate; a blank reply is
    /// [`VerityError::EmptyResult`].
    pub async fn summarize(&self, quote: &Quote, result: &VerdictResult) -> Result<String> {
        let prompt = build_summary_prompt(quote, result);
        let reply = self.client.complete(&prompt).await?;
        let text = reply.trim();
        if text.is_empty() {
            return Err(VerityError::EmptyResult("No summary returned from model".into()));
        }
        tracing::debug!(chars = text.len(), "summary generated");
        Ok(text.to_string())
    }
}

impl std::fmt::Debug for SummaryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryGenerator")
            .field("client", &self.client.name())
            .finish()
    }
}
