//! Page-oriented PDF processor.
//!
//! Extracts text page by page with `lopdf`, splitting each page's text into
//! overlapping chunks. Chunk indices restart on every page, so a chunk is
//! addressed by `(filename, page_number, chunk_index)`.

use std::path::Path;

use serde_json::json;
use tracing::debug;

use crate::chunking::split_text;
use crate::document::{ChunkMetadata, DocumentChunk};
use crate::error::{KbError, Result};
use crate::processor::DocumentProcessor;

/// Processes `.pdf` files into per-page text chunks.
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl PdfProcessor {
    /// Create a new processor with the given chunking parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl DocumentProcessor for PdfProcessor {
    fn can_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    }

    fn process(&self, path: &Path) -> Result<Vec<DocumentChunk>> {
        let failed = |message: String| KbError::ProcessingFailed {
            path: path.to_path_buf(),
            message,
        };

        let doc =
            lopdf::Document::load(path).map_err(|e| failed(format!("cannot load PDF: {e}")))?;
        let pages = doc.get_pages();

        let mut metadata = ChunkMetadata::for_file(path);
        metadata.extra.insert("num_pages".to_string(), json!(pages.len()));

        let mut chunks = Vec::new();
        for &page_number in pages.keys() {
            let text = doc
                .extract_text(&[page_number])
                .map_err(|e| failed(format!("text extraction failed on page {page_number}: {e}")))?;

            // Pages with only whitespace produce no chunks.
            if text.trim().is_empty() {
                continue;
            }

            for (idx, content) in
                split_text(&text, self.chunk_size, self.chunk_overlap)?.into_iter().enumerate()
            {
                chunks.push(DocumentChunk {
                    content,
                    metadata: metadata.clone(),
                    page_number: Some(page_number),
                    chunk_index: idx as u32,
                });
            }
        }

        debug!(path = %path.display(), pages = pages.len(), chunks = chunks.len(), "extracted PDF content");
        Ok(chunks)
    }
}
