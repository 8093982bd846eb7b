//! Shared test doubles: a deterministic embedder and a counting
//! completion stub.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use docbase::{
    ChunkMetadata, CompletionProvider, DocumentChunk, EmbeddingProvider, Result,
};

/// Deterministic embedding provider: the same text always maps to the same
/// vector, so a query identical to a stored chunk has distance ~0 to it.
pub struct HashEmbedder {
    dims: usize,
    calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[(i + b as usize) % self.dims] += 1.0 + (b % 7) as f32;
        }
        if v.iter().all(|x| *x == 0.0) {
            v[0] = 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector(text))
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Completion stub returning a canned response and counting invocations.
pub struct StubCompletions {
    response: String,
    calls: AtomicUsize,
}

impl StubCompletions {
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for StubCompletions {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Build a chunk as a document processor would.
pub fn make_chunk(
    filename: &str,
    content: &str,
    page_number: Option<u32>,
    chunk_index: u32,
) -> DocumentChunk {
    DocumentChunk {
        content: content.to_string(),
        metadata: ChunkMetadata::for_file(Path::new(filename)),
        page_number,
        chunk_index,
    }
}
