//! LLM completion clients.
//!
//! The ranking and summary passes only need "one prompt in, one text out",
//! expressed by [`CompletionClient`]. [`gemini::GeminiClient`] implements it
//! over the `generateContent` REST endpoint.

pub mod gemini;

use async_trait::async_trait;

use crate::error::Result;

pub use gemini::{GeminiClient, GeminiConfig};

/// A single-shot, non-streaming text completion service.
///
/// Implementations make exactly one request per call and never retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as a single user turn and return the reply text.
    ///
    /// # Errors
    ///
    /// [`crate::VerityError::Transport`] when no response arrived,
    /// [`crate::VerityError::Upstream`] for a non-success status,
    /// [`crate::VerityError::Parse`] for an undecodable body and
    /// [`crate::VerityError::EmptyResult`] when the reply holds no text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Short provider name used in log fields.
    fn name(&self) -> &str;
}
