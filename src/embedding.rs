//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_documents`](EmbeddingProvider::embed_documents)
/// implementation calls [`embed_query`](EmbeddingProvider::embed_query)
/// sequentially; backends with native batching should override it — batching
/// is a performance contract, not a correctness one.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of document texts.
    ///
    /// The default implementation embeds each text sequentially. Override
    /// this method if the backend supports native batch embedding.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_query(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    ///
    /// The dimensionality is fixed for the lifetime of any store built on
    /// this provider.
    fn dimensions(&self) -> usize;
}
