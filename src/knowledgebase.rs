//! Knowledge base facade.
//!
//! [`KnowledgeBase`] wires the processor registry, knowledge store, and QA
//! engine together behind the interface consumed by outer layers: add and
//! delete documents (including the on-disk copy), ask questions, extract
//! insights, generate tests, list documents, and report stats.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::completion::CompletionProvider;
use crate::config::KbConfig;
use crate::disk::DiskIndex;
use crate::embedding::EmbeddingProvider;
use crate::error::{KbError, Result};
use crate::index::VectorIndex;
use crate::openai::{OpenAiCompletions, OpenAiEmbeddings};
use crate::parsing::TestCase;
use crate::qa::{Answer, QaEngine, TestType};
use crate::registry::ProcessorRegistry;
use crate::store::{KnowledgeStore, StoreStats};

/// Result of adding a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedDocument {
    /// The ingested document's filename.
    pub filename: String,
    /// Number of chunks stored.
    pub chunks_added: usize,
    /// Where the document copy was placed.
    pub stored_path: PathBuf,
}

/// Result of deleting a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedDocument {
    /// The deleted document's filename.
    pub filename: String,
    /// Number of chunks removed from the store.
    pub chunks_deleted: usize,
    /// Whether a stored file copy existed and was removed.
    pub file_deleted: bool,
}

/// Main interface for the knowledge base system.
pub struct KnowledgeBase {
    config: KbConfig,
    registry: ProcessorRegistry,
    store: Arc<KnowledgeStore>,
    qa: QaEngine,
}

impl KnowledgeBase {
    /// Create a new builder for wiring custom capabilities.
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// Open a knowledge base with the default OpenAI capabilities and the
    /// disk-persisted index described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidConfiguration`] for bad configuration and
    /// [`KbError::Index`] / [`KbError::Io`] if the storage locations cannot
    /// be prepared.
    pub async fn open(config: KbConfig) -> Result<Self> {
        let embeddings = Arc::new(OpenAiEmbeddings::from_config(&config)?);
        let completions = Arc::new(OpenAiCompletions::from_config(&config)?);
        let index = Arc::new(DiskIndex::open(config.index_dir(), &config.collection).await?);

        Self::builder()
            .config(config)
            .embedding_provider(embeddings)
            .completion_provider(completions)
            .vector_index(index)
            .build()
    }

    /// Return the configuration this knowledge base was built with.
    pub fn config(&self) -> &KbConfig {
        &self.config
    }

    /// Return the underlying knowledge store.
    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }

    /// Add a document: extract, chunk, embed, store, and copy the file
    /// into the documents directory (last write wins on name collision).
    pub async fn add_document(&self, path: impl AsRef<Path>) -> Result<AddedDocument> {
        let path = path.as_ref();
        info!(path = %path.display(), "processing document");

        let chunks = self.registry.process_document(path)?;
        let ids = self.store.add_chunks(&chunks).await?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stored_path = self.config.documents_dir().join(&filename);
        tokio::fs::copy(path, &stored_path)
            .await
            .map_err(|e| KbError::Io { path: stored_path.clone(), source: e })?;

        info!(filename = %filename, chunks_added = ids.len(), "added document");
        Ok(AddedDocument { filename, chunks_added: ids.len(), stored_path })
    }

    /// Ask a question about the stored documents.
    pub async fn ask_question(&self, question: &str, n_results: usize) -> Result<Answer> {
        self.qa.answer_question(question, n_results).await
    }

    /// Extract key insights, optionally restricted to one document.
    pub async fn get_insights(
        &self,
        document_name: Option<&str>,
        max_insights: usize,
    ) -> Result<Vec<String>> {
        self.qa.extract_insights(document_name, max_insights).await
    }

    /// Generate test cases from the documentation.
    pub async fn generate_tests(
        &self,
        document_name: Option<&str>,
        test_type: TestType,
    ) -> Result<Vec<TestCase>> {
        self.qa.generate_tests(document_name, test_type).await
    }

    /// List all documents in the knowledge base, alphabetically.
    pub async fn list_documents(&self) -> Result<Vec<String>> {
        self.store.list_documents().await
    }

    /// Delete a document's chunks and its stored file copy.
    pub async fn delete_document(&self, filename: &str) -> Result<DeletedDocument> {
        let chunks_deleted = self.store.delete_document(filename).await?;

        let file_path = self.config.documents_dir().join(filename);
        let file_deleted = match tokio::fs::remove_file(&file_path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(KbError::Io { path: file_path, source: e }),
        };

        info!(filename, chunks_deleted, file_deleted, "deleted document");
        Ok(DeletedDocument { filename: filename.to_string(), chunks_deleted, file_deleted })
    }

    /// Return statistics about the knowledge base.
    pub async fn stats(&self) -> Result<StoreStats> {
        self.store.stats().await
    }
}

/// Builder for constructing a [`KnowledgeBase`] from explicit capabilities.
///
/// All of config, embedding provider, completion provider, and vector index
/// are required; the processor registry defaults to the built-in formats
/// configured with the config's chunking parameters.
#[derive(Default)]
pub struct KnowledgeBaseBuilder {
    config: Option<KbConfig>,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    completions: Option<Arc<dyn CompletionProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    registry: Option<ProcessorRegistry>,
}

impl KnowledgeBaseBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: KbConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embeddings = Some(provider);
        self
    }

    /// Set the completion provider.
    pub fn completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completions = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Replace the default processor registry.
    pub fn registry(mut self, registry: ProcessorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the [`KnowledgeBase`], validating required fields and ensuring
    /// the documents directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidConfiguration`] if a required field is
    /// missing and [`KbError::Io`] if the documents directory cannot be
    /// created.
    pub fn build(self) -> Result<KnowledgeBase> {
        let config = self
            .config
            .ok_or_else(|| KbError::InvalidConfiguration("config is required".to_string()))?;
        let embeddings = self.embeddings.ok_or_else(|| {
            KbError::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let completions = self.completions.ok_or_else(|| {
            KbError::InvalidConfiguration("completion_provider is required".to_string())
        })?;
        let index = self
            .index
            .ok_or_else(|| KbError::InvalidConfiguration("vector_index is required".to_string()))?;

        let documents_dir = config.documents_dir();
        std::fs::create_dir_all(&documents_dir)
            .map_err(|e| KbError::Io { path: documents_dir, source: e })?;

        let registry = self
            .registry
            .unwrap_or_else(|| ProcessorRegistry::with_defaults(config.chunk_size, config.chunk_overlap));

        let store = Arc::new(KnowledgeStore::new(embeddings, index));
        let qa = QaEngine::new(Arc::clone(&store), completions);

        Ok(KnowledgeBase { config, registry, store, qa })
    }
}
