//! Data types for document chunks, stored records, and search results.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KbError, Result};

/// A scalar metadata value as persisted by the vector index.
///
/// The index stores flat key-value metadata only; nested structures are
/// rejected at ingestion with [`KbError::InvalidMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A string value.
    Str(String),
    /// A signed integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl MetadataValue {
    /// Return the value as a string slice if it is a [`MetadataValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Return the value as an integer if it is a [`MetadataValue::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert a JSON value into a scalar metadata value.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::InvalidMetadata`] for arrays, objects, and null —
    /// callers must stringify nested structures before storage.
    pub fn from_json(key: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(MetadataValue::Str(s.clone())),
            serde_json::Value::Bool(b) => Ok(MetadataValue::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(MetadataValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(MetadataValue::Float(f))
                } else {
                    Err(KbError::InvalidMetadata {
                        key: key.to_string(),
                        message: format!("unrepresentable number: {n}"),
                    })
                }
            }
            other => Err(KbError::InvalidMetadata {
                key: key.to_string(),
                message: format!(
                    "non-scalar values are not supported (got {})",
                    json_type_name(other)
                ),
            }),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Str(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Int(i)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

/// An exact-equality metadata filter: a record matches when every entry
/// equals the record's value for that key.
pub type MetadataFilter = HashMap<String, MetadataValue>;

/// Well-known metadata attached to every chunk by its processor.
///
/// The closed fields keep the storage contract type-checkable; `extra`
/// carries processor-specific keys (`supports_hebrew`, `num_pages`,
/// `image_count`) forward without widening the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// The source document's file name.
    pub filename: String,
    /// The full path the document was ingested from.
    pub file_path: String,
    /// The file extension, including the leading dot.
    pub file_extension: String,
    /// The kind of content in the chunk (currently always `"text"`).
    pub chunk_type: String,
    /// Processor-specific additive keys. Values must be JSON scalars;
    /// nested structures are rejected at storage time.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ChunkMetadata {
    /// Build metadata for a source file with the default `"text"` chunk type.
    pub fn for_file(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_path: path.display().to_string(),
            file_extension: extension,
            chunk_type: "text".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// The unit of retrievable content produced by a document processor.
///
/// Chunks are immutable after creation and consumed exactly once by
/// [`KnowledgeStore::add_chunks`](crate::store::KnowledgeStore::add_chunks),
/// which assigns store-level identity and an embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// The chunk's text content.
    pub content: String,
    /// Well-known metadata plus processor-specific keys.
    pub metadata: ChunkMetadata,
    /// 1-based page number, present only for page-oriented formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Split-order index, unique within the (document, page) scope.
    pub chunk_index: u32,
}

/// The persisted form of a chunk inside the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Globally unique identifier assigned at insertion time.
    pub id: String,
    /// Fixed-length embedding vector for the record's content.
    pub embedding: Vec<f32>,
    /// The chunk content, copied verbatim.
    pub content: String,
    /// Flattened scalar metadata. Always contains a non-empty `filename`;
    /// document listing and deletion depend on that invariant.
    pub metadata: HashMap<String, MetadataValue>,
}

/// A transient value returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched record's content.
    pub content: String,
    /// The matched record's metadata.
    pub metadata: HashMap<String, MetadataValue>,
    /// Similarity distance; lower means more similar.
    pub distance: f32,
}
