//! Processor registry: capability-probe dispatch over registered formats.

use std::path::Path;

use tracing::info;

use crate::document::DocumentChunk;
use crate::docx::DocxProcessor;
use crate::error::{KbError, Result};
use crate::pdf::PdfProcessor;
use crate::processor::DocumentProcessor;

/// Selects the right [`DocumentProcessor`] for a file and delegates to it.
///
/// Processors are probed in registration order and the first match wins;
/// registration order is the documented tie-break if two variants ever
/// claim the same extension.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in processors (PDF, then DOCX)
    /// configured with the given chunking parameters.
    pub fn with_defaults(chunk_size: usize, chunk_overlap: usize) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PdfProcessor::new(chunk_size, chunk_overlap)));
        registry.register(Box::new(DocxProcessor::new(chunk_size, chunk_overlap)));
        registry
    }

    /// Register a processor. Later registrations are probed after earlier ones.
    pub fn register(&mut self, processor: Box<dyn DocumentProcessor>) {
        self.processors.push(processor);
    }

    /// Return the first registered processor whose probe accepts the path.
    pub fn select_processor(&self, path: &Path) -> Option<&dyn DocumentProcessor> {
        self.processors.iter().find(|p| p.can_process(path)).map(|p| p.as_ref())
    }

    /// Process a document with the matching processor.
    ///
    /// # Errors
    ///
    /// - [`KbError::FileNotFound`] if the path does not exist.
    /// - [`KbError::UnsupportedFormat`] if no registered processor matches.
    /// - [`KbError::ProcessingFailed`] if extraction fails inside the
    ///   matched processor; output is never partial.
    pub fn process_document(&self, path: &Path) -> Result<Vec<DocumentChunk>> {
        if !path.exists() {
            return Err(KbError::FileNotFound { path: path.to_path_buf() });
        }

        let processor =
            self.select_processor(path).ok_or_else(|| KbError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })?;

        let chunks = processor.process(path)?;
        info!(path = %path.display(), chunks = chunks.len(), "processed document");
        Ok(chunks)
    }
}
