//! Configuration for the knowledge base.
//!
//! A [`KbConfig`] is constructed once at startup — via [`KbConfig::from_env`]
//! or the builder — and passed by reference into the components that need
//! it. Core logic never performs ambient environment lookups.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KbError, Result};

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default vector index collection name.
pub const DEFAULT_COLLECTION: &str = "knowledge_base";

/// Validated configuration for the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbConfig {
    /// API key for the embedding and completion capabilities.
    pub api_key: String,
    /// Completion model name.
    pub completion_model: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Base directory for persisted state (index and document copies).
    pub data_dir: PathBuf,
    /// Name of the vector index collection.
    pub collection: String,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
}

impl KbConfig {
    /// Create a new builder for constructing a [`KbConfig`].
    pub fn builder() -> KbConfigBuilder {
        KbConfigBuilder::default()
    }

    /// Load configuration from the environment.
    ///
    /// Reads `OPENAI_API_KEY` (required), `OPENAI_MODEL`, `EMBEDDING_MODEL`,
    /// and `DATA_DIR` (all optional with defaults).
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidConfiguration`] if `OPENAI_API_KEY` is unset
    /// or validation fails.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.api_key(key);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            builder = builder.completion_model(model);
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            builder = builder.data_dir(dir);
        }
        builder.build()
    }

    /// Directory holding the persisted vector index.
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Directory holding copies of ingested documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }
}

/// Builder for constructing a validated [`KbConfig`].
#[derive(Debug, Clone)]
pub struct KbConfigBuilder {
    config: KbConfig,
}

impl Default for KbConfigBuilder {
    fn default() -> Self {
        Self {
            config: KbConfig {
                api_key: String::new(),
                completion_model: "gpt-4".to_string(),
                embedding_model: "text-embedding-3-small".to_string(),
                data_dir: PathBuf::from("data"),
                collection: DEFAULT_COLLECTION.to_string(),
                chunk_size: DEFAULT_CHUNK_SIZE,
                chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            },
        }
    }
}

impl KbConfigBuilder {
    /// Set the API key for the embedding and completion capabilities.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the completion model name.
    pub fn completion_model(mut self, model: impl Into<String>) -> Self {
        self.config.completion_model = model.into();
        self
    }

    /// Set the embedding model name.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the base data directory.
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.data_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the vector index collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Build the [`KbConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidConfiguration`] if:
    /// - `api_key` is empty
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `collection` is empty
    pub fn build(self) -> Result<KbConfig> {
        if self.config.api_key.is_empty() {
            return Err(KbError::InvalidConfiguration(
                "api_key is not set; set OPENAI_API_KEY or provide one explicitly".to_string(),
            ));
        }
        if self.config.chunk_size == 0 {
            return Err(KbError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(KbError::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.collection.is_empty() {
            return Err(KbError::InvalidConfiguration(
                "collection name must not be empty".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = KbConfig::builder().api_key("sk-test").build().unwrap();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.collection, DEFAULT_COLLECTION);
        assert_eq!(config.index_dir(), PathBuf::from("data/index"));
        assert_eq!(config.documents_dir(), PathBuf::from("data/documents"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = KbConfig::builder().build().unwrap_err();
        assert!(matches!(err, KbError::InvalidConfiguration(_)));
    }

    #[test]
    fn overlap_must_be_less_than_chunk_size() {
        let err =
            KbConfig::builder().api_key("sk-test").chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(err, Err(KbError::InvalidConfiguration(_))));
    }
}
