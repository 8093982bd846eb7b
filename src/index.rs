//! Vector index trait for storing and searching embedded records.

use async_trait::async_trait;

use crate::document::{MetadataFilter, SearchResult, StoredRecord};
use crate::error::Result;

/// A storage backend for embedded records with similarity search.
///
/// Implementations manage one collection of [`StoredRecord`]s and support
/// insertion, metadata-filtered similarity queries, metadata-filtered
/// scans, deletion by id, and counting. The index's own atomicity
/// guarantees are the only write coordination the core relies on.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert records into the index.
    ///
    /// Records carry their embeddings; from the caller's point of view the
    /// insert is all-or-nothing.
    async fn add(&self, records: Vec<StoredRecord>) -> Result<()>;

    /// Return the `k` records most similar to `embedding`, optionally
    /// restricted to records whose metadata matches `filter` exactly.
    ///
    /// Results are ordered by increasing distance (most similar first).
    /// An empty index yields an empty result, never an error.
    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>>;

    /// Return all records whose metadata matches `filter` exactly, or every
    /// record when no filter is given.
    async fn get(&self, filter: Option<&MetadataFilter>) -> Result<Vec<StoredRecord>>;

    /// Delete records by id. Unknown ids are ignored.
    async fn delete(&self, ids: &[String]) -> Result<()>;

    /// Return the total number of records in the index.
    async fn count(&self) -> Result<usize>;
}

/// Check whether a record's metadata matches a filter by exact equality
/// on every provided key.
pub(crate) fn matches_filter(record: &StoredRecord, filter: Option<&MetadataFilter>) -> bool {
    match filter {
        None => true,
        Some(filter) => {
            filter.iter().all(|(key, value)| record.metadata.get(key) == Some(value))
        }
    }
}
