//! Error types for the `docbase` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in knowledge base operations.
#[derive(Debug, Error)]
pub enum KbError {
    /// Invalid configuration detected at startup (bad chunk parameters,
    /// missing credentials). Fatal before any operation runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested input file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// No registered processor can handle the file's format.
    #[error("unsupported format '{extension}' for file: {}", path.display())]
    UnsupportedFormat {
        /// The path that was probed.
        path: PathBuf,
        /// The file extension that no processor matched.
        extension: String,
    },

    /// Extraction failed inside a document processor.
    #[error("processing failed for {}: {message}", path.display())]
    ProcessingFailed {
        /// The document that failed to process.
        path: PathBuf,
        /// A description of the underlying extraction failure.
        message: String,
    },

    /// An ingestion write did not complete; the document must be treated
    /// as not added.
    #[error("store write failed: {message}")]
    StoreWriteFailed {
        /// A description of the failure.
        message: String,
    },

    /// Chunk metadata contained a value the store cannot persist.
    #[error("invalid metadata for key '{key}': {message}")]
    InvalidMetadata {
        /// The offending metadata key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A query-time retrieval from the store failed.
    #[error("retrieval failed: {0}")]
    RetrievalFailed(String),

    /// The completion capability failed while generating output.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// An error occurred in an embedding provider.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in a completion provider.
    #[error("completion error ({provider}): {message}")]
    Completion {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("vector index error ({backend}): {message}")]
    Index {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path involved in the failed operation.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A convenience result type for knowledge base operations.
pub type Result<T> = std::result::Result<T, KbError>;
