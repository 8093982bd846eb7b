//! Completion provider trait for single-turn text generation.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that completes a prompt with generated text.
///
/// Synchronous single-turn semantics: one prompt in, one text out. Retry
/// policy, if any, belongs to the implementation — the retrieval layer
/// never retries a failed completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
