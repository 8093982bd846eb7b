//! Vector-backed knowledge store.
//!
//! [`KnowledgeStore`] owns exactly one [`EmbeddingProvider`] and one
//! [`VectorIndex`] and exposes the document-level operations the rest of
//! the system builds on: add, filtered similarity search, listing,
//! deletion by filename, and stats. The store has no document entity of
//! its own — documents exist only as the grouping key `filename` in
//! record metadata.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::document::{DocumentChunk, MetadataFilter, MetadataValue, SearchResult, StoredRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{KbError, Result};
use crate::index::VectorIndex;

/// Aggregate statistics over the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of stored records.
    pub total_chunks: usize,
    /// Number of distinct documents.
    pub total_documents: usize,
    /// Distinct document filenames, alphabetically ordered.
    pub documents: Vec<String>,
}

/// Store and retrieve document knowledge using vector embeddings.
pub struct KnowledgeStore {
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl KnowledgeStore {
    /// Create a store over the given embedding provider and vector index.
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embeddings, index }
    }

    /// Add document chunks to the store, returning the assigned record ids.
    ///
    /// An empty input is a no-op returning an empty sequence. Otherwise all
    /// chunk contents are embedded in a single batched provider call, each
    /// chunk gets a fresh unique id, and the records are inserted together.
    /// Re-adding identical content produces new ids and duplicate entries;
    /// deletion is by filename, not id.
    ///
    /// # Errors
    ///
    /// - [`KbError::InvalidMetadata`] if a chunk carries a non-scalar
    ///   metadata value or an empty filename; checked before any embedding
    ///   call is made.
    /// - [`KbError::StoreWriteFailed`] if embedding or insertion fails; the
    ///   caller must treat the document as not added.
    pub async fn add_chunks(&self, chunks: &[DocumentChunk]) -> Result<Vec<String>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        // Flatten metadata first so invalid chunks fail before the
        // embedding capability is invoked.
        let metadatas: Vec<HashMap<String, MetadataValue>> =
            chunks.iter().map(flatten_metadata).collect::<Result<_>>()?;

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embeddings.embed_documents(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
            KbError::StoreWriteFailed { message: format!("embedding failed: {e}") }
        })?;

        if embeddings.len() != chunks.len() {
            return Err(KbError::StoreWriteFailed {
                message: format!(
                    "embedding provider returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }

        // The provider's declared dimensionality is what the index is
        // sized for; a vector of any other length must not be stored.
        let expected_dims = self.embeddings.dimensions();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected_dims) {
            return Err(KbError::StoreWriteFailed {
                message: format!(
                    "embedding provider declared {expected_dims} dimensions but returned a vector of {}",
                    bad.len()
                ),
            });
        }

        let mut ids = Vec::with_capacity(chunks.len());
        let mut records = Vec::with_capacity(chunks.len());
        for ((chunk, metadata), embedding) in chunks.iter().zip(metadatas).zip(embeddings) {
            let id = Uuid::new_v4().to_string();
            ids.push(id.clone());
            records.push(StoredRecord {
                id,
                embedding,
                content: chunk.content.clone(),
                metadata,
            });
        }

        self.index.add(records).await.map_err(|e| {
            error!(error = %e, "insert failed during ingestion");
            KbError::StoreWriteFailed { message: format!("index insert failed: {e}") }
        })?;

        info!(chunk_count = ids.len(), "added chunks to knowledge store");
        Ok(ids)
    }

    /// Search for the `n_results` records most similar to `query`, optionally
    /// restricted to records whose metadata matches `filter` exactly.
    ///
    /// Results are ordered by increasing distance. An empty store or a
    /// filter that matches nothing yields an empty sequence, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::RetrievalFailed`] if embedding the query or
    /// querying the index fails.
    pub async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embeddings.embed_query(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            KbError::RetrievalFailed(format!("query embedding failed: {e}"))
        })?;

        self.index.query(&query_embedding, n_results, filter).await.map_err(|e| {
            error!(error = %e, "vector index query failed");
            KbError::RetrievalFailed(format!("index query failed: {e}"))
        })
    }

    /// Return the distinct filenames in the store, alphabetically ordered.
    pub async fn list_documents(&self) -> Result<Vec<String>> {
        let records = self.scan().await?;
        Ok(distinct_filenames(&records))
    }

    /// Delete every record whose `filename` metadata equals the argument.
    ///
    /// Returns the number of records removed; 0 when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::StoreWriteFailed`] if the deletion fails.
    pub async fn delete_document(&self, filename: &str) -> Result<usize> {
        let filter: MetadataFilter =
            [("filename".to_string(), MetadataValue::from(filename))].into();

        let matching = self.index.get(Some(&filter)).await.map_err(|e| {
            KbError::StoreWriteFailed { message: format!("lookup before delete failed: {e}") }
        })?;
        if matching.is_empty() {
            return Ok(0);
        }

        let ids: Vec<String> = matching.into_iter().map(|r| r.id).collect();
        self.index.delete(&ids).await.map_err(|e| {
            error!(filename, error = %e, "delete failed");
            KbError::StoreWriteFailed { message: format!("index delete failed: {e}") }
        })?;

        info!(filename, removed = ids.len(), "deleted document from knowledge store");
        Ok(ids.len())
    }

    /// Return statistics about the store.
    ///
    /// Both counts are derived from one scan so they describe the same
    /// snapshot of the index.
    pub async fn stats(&self) -> Result<StoreStats> {
        let records = self.scan().await?;
        let documents = distinct_filenames(&records);
        Ok(StoreStats {
            total_chunks: records.len(),
            total_documents: documents.len(),
            documents,
        })
    }

    async fn scan(&self) -> Result<Vec<StoredRecord>> {
        self.index
            .get(None)
            .await
            .map_err(|e| KbError::RetrievalFailed(format!("index scan failed: {e}")))
    }
}

fn distinct_filenames(records: &[StoredRecord]) -> Vec<String> {
    let names: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.metadata.get("filename").and_then(MetadataValue::as_str))
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Flatten a chunk's metadata into the scalar map persisted by the index.
///
/// Well-known fields come first; `page_number` and `chunk_index` are added
/// when present; processor-specific extras are converted last and may not
/// be nested.
fn flatten_metadata(chunk: &DocumentChunk) -> Result<HashMap<String, MetadataValue>> {
    let meta = &chunk.metadata;
    if meta.filename.is_empty() {
        return Err(KbError::InvalidMetadata {
            key: "filename".to_string(),
            message: "every stored record must carry a non-empty filename".to_string(),
        });
    }

    let mut flat = HashMap::new();
    flat.insert("filename".to_string(), MetadataValue::from(meta.filename.clone()));
    flat.insert("file_path".to_string(), MetadataValue::from(meta.file_path.clone()));
    flat.insert("file_extension".to_string(), MetadataValue::from(meta.file_extension.clone()));
    flat.insert("chunk_type".to_string(), MetadataValue::from(meta.chunk_type.clone()));

    if let Some(page) = chunk.page_number {
        flat.insert("page_number".to_string(), MetadataValue::Int(page as i64));
    }
    flat.insert("chunk_index".to_string(), MetadataValue::Int(chunk.chunk_index as i64));

    for (key, value) in &meta.extra {
        flat.insert(key.clone(), MetadataValue::from_json(key, value)?);
    }

    Ok(flat)
}
