//! JSON-file-persisted vector index using cosine distance.
//!
//! [`DiskIndex`] keeps all records in memory behind a `tokio::sync::RwLock`
//! and rewrites one JSON file per collection after every mutation. Suitable
//! for single-process knowledge bases at document scale; swap in another
//! [`VectorIndex`] implementation for anything larger.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{MetadataFilter, SearchResult, StoredRecord};
use crate::error::{KbError, Result};
use crate::index::{VectorIndex, matches_filter};

const BACKEND: &str = "disk";

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexState {
    records: HashMap<String, StoredRecord>,
}

/// A vector index persisted as one JSON file per collection.
#[derive(Debug)]
pub struct DiskIndex {
    path: PathBuf,
    state: RwLock<IndexState>,
}

impl DiskIndex {
    /// Open the named collection under `dir`, creating the directory and
    /// loading any previously persisted records.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::Index`] if the directory cannot be created or an
    /// existing collection file cannot be read or parsed.
    pub async fn open(dir: impl AsRef<Path>, collection: &str) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|e| KbError::Index {
            backend: BACKEND.to_string(),
            message: format!("failed to create index directory {}: {e}", dir.display()),
        })?;

        let path = dir.join(format!("{collection}.json"));
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| KbError::Index {
                backend: BACKEND.to_string(),
                message: format!("failed to parse collection file {}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexState::default(),
            Err(e) => {
                return Err(KbError::Index {
                    backend: BACKEND.to_string(),
                    message: format!("failed to read collection file {}: {e}", path.display()),
                });
            }
        };

        debug!(collection, records = state.records.len(), "opened disk index");
        Ok(Self { path, state: RwLock::new(state) })
    }

    /// Serialize the state to a temporary file, then rename it over the
    /// collection file so readers never observe a partial write.
    async fn persist(&self, state: &IndexState) -> Result<()> {
        let bytes = serde_json::to_vec(state).map_err(|e| KbError::Index {
            backend: BACKEND.to_string(),
            message: format!("failed to serialize index state: {e}"),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| KbError::Index {
            backend: BACKEND.to_string(),
            message: format!("failed to write {}: {e}", tmp.display()),
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| KbError::Index {
            backend: BACKEND.to_string(),
            message: format!("failed to replace {}: {e}", self.path.display()),
        })
    }
}

/// Compute cosine distance between two vectors: `1 - cosine_similarity`,
/// so lower values mean more similar.
///
/// Returns 1.0 if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for DiskIndex {
    async fn add(&self, records: Vec<StoredRecord>) -> Result<()> {
        let mut state = self.state.write().await;

        // Dimensionality is fixed for the collection's lifetime.
        if let Some(existing) = state.records.values().next() {
            let expected = existing.embedding.len();
            if let Some(record) = records.iter().find(|r| r.embedding.len() != expected) {
                return Err(KbError::Index {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "embedding dimension mismatch: collection has {expected}, record '{}' has {}",
                        record.id,
                        record.embedding.len()
                    ),
                });
            }
        }

        // Stage the insert and commit to memory only once the file write
        // succeeds, so a failed persist leaves the index unchanged.
        let mut staged = IndexState { records: state.records.clone() };
        for record in records {
            staged.records.insert(record.id.clone(), record);
        }
        self.persist(&staged).await?;
        *state = staged;
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let state = self.state.read().await;

        let mut scored: Vec<SearchResult> = state
            .records
            .values()
            .filter(|record| matches_filter(record, filter))
            .map(|record| SearchResult {
                content: record.content.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(&record.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn get(&self, filter: Option<&MetadataFilter>) -> Result<Vec<StoredRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .filter(|record| matches_filter(record, filter))
            .cloned()
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        let mut state = self.state.write().await;
        let mut staged = IndexState { records: state.records.clone() };
        for id in ids {
            staged.records.remove(id);
        }
        self.persist(&staged).await?;
        *state = staged;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state.records.len())
    }
}
