//! Retrieval-augmented document knowledge base.
//!
//! `docbase` ingests documents, splits them into retrievable chunks, stores
//! them with vector embeddings, and answers natural-language questions by
//! retrieving relevant chunks and conditioning a language model on them.
//!
//! # Architecture
//!
//! - [`ProcessorRegistry`] selects a [`DocumentProcessor`] by capability
//!   probe and extracts a file into [`DocumentChunk`]s.
//! - [`KnowledgeStore`] owns an [`EmbeddingProvider`] and a [`VectorIndex`]
//!   and exposes add / filtered search / list / delete / stats.
//! - [`QaEngine`] composes search results into prompts, invokes a
//!   [`CompletionProvider`], and parses the output into answers, insights,
//!   or test cases.
//! - [`KnowledgeBase`] is the facade tying them together, including the
//!   on-disk document copies.
//!
//! # Example
//!
//! ```rust,ignore
//! use docbase::{KbConfig, KnowledgeBase};
//!
//! let config = KbConfig::from_env()?;
//! let kb = KnowledgeBase::open(config).await?;
//!
//! kb.add_document("specs/process.pdf").await?;
//! let answer = kb.ask_question("מה תהליך האישור?", 5).await?;
//! println!("{}", answer.answer);
//! ```

pub mod chunking;
pub mod completion;
pub mod config;
pub mod disk;
pub mod document;
pub mod docx;
pub mod embedding;
pub mod error;
pub mod index;
pub mod knowledgebase;
pub mod openai;
pub mod parsing;
pub mod pdf;
pub mod processor;
pub mod qa;
pub mod registry;
pub mod store;

pub use chunking::split_text;
pub use completion::CompletionProvider;
pub use config::{KbConfig, KbConfigBuilder};
pub use disk::DiskIndex;
pub use document::{
    ChunkMetadata, DocumentChunk, MetadataFilter, MetadataValue, SearchResult, StoredRecord,
};
pub use docx::DocxProcessor;
pub use embedding::EmbeddingProvider;
pub use error::{KbError, Result};
pub use index::VectorIndex;
pub use knowledgebase::{AddedDocument, DeletedDocument, KnowledgeBase, KnowledgeBaseBuilder};
pub use openai::{OpenAiCompletions, OpenAiEmbeddings};
pub use parsing::{TestCase, parse_insights, parse_test_cases};
pub use pdf::PdfProcessor;
pub use processor::DocumentProcessor;
pub use qa::{Answer, NO_INFORMATION_ANSWER, QaEngine, SourceRef, TestType};
pub use registry::ProcessorRegistry;
pub use store::{KnowledgeStore, StoreStats};
