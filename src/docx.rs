//! Word-processor document processor.
//!
//! Extracts paragraph and table text from DOCX archives (`word/document.xml`
//! inside the ZIP container) and splits the combined text into overlapping
//! chunks. Hebrew content passes through untouched; chunk boundaries are
//! character-based.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::json;
use tracing::debug;

use crate::chunking::split_text;
use crate::document::{ChunkMetadata, DocumentChunk};
use crate::error::{KbError, Result};
use crate::processor::DocumentProcessor;

/// Processes `.docx`/`.doc` files: top-level paragraphs first, then table
/// rows with cells joined by `" | "`.
#[derive(Debug, Clone)]
pub struct DocxProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocxProcessor {
    /// Create a new processor with the given chunking parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

/// Text content pulled out of a DOCX body.
#[derive(Debug, Default)]
struct DocxContent {
    /// Top-level paragraphs, in document order.
    paragraphs: Vec<String>,
    /// Table rows as cell texts, in document order.
    rows: Vec<Vec<String>>,
    /// Number of inline drawings (images are noted, never extracted).
    image_count: usize,
}

/// Stream `word/document.xml` and collect paragraph, table, and image
/// information in a single pass.
fn parse_document_xml(xml: &str) -> std::result::Result<DocxContent, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut content = DocxContent::default();

    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut paragraph: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:tr" if table_depth > 0 => content.rows.push(Vec::new()),
                b"w:tc" if table_depth > 0 => {
                    if let Some(row) = content.rows.last_mut() {
                        row.push(String::new());
                    }
                }
                b"w:p" if table_depth == 0 => paragraph = Some(String::new()),
                b"w:t" => in_text = true,
                b"w:drawing" => content.image_count += 1,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"w:drawing" => content.image_count += 1,
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if table_depth == 0 => {
                    if let Some(text) = paragraph.take() {
                        if !text.trim().is_empty() {
                            content.paragraphs.push(text);
                        }
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape()?;
                if table_depth > 0 {
                    if let Some(cell) = content.rows.last_mut().and_then(|r| r.last_mut()) {
                        cell.push_str(&text);
                    }
                } else if let Some(p) = paragraph.as_mut() {
                    p.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(content)
}

impl DocumentProcessor for DocxProcessor {
    fn can_process(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref(),
            Some("docx") | Some("doc")
        )
    }

    fn process(&self, path: &Path) -> Result<Vec<DocumentChunk>> {
        let failed = |message: String| KbError::ProcessingFailed {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| failed(format!("cannot open file: {e}")))?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| failed(format!("not a DOCX archive: {e}")))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| failed(format!("missing document body: {e}")))?
            .read_to_string(&mut xml)
            .map_err(|e| failed(format!("cannot read document body: {e}")))?;

        let content =
            parse_document_xml(&xml).map_err(|e| failed(format!("malformed document XML: {e}")))?;

        // Paragraphs first, then table rows with cells joined " | ".
        let mut text_content = content.paragraphs;
        for row in content.rows {
            let row_text =
                row.iter().map(|c| c.trim()).collect::<Vec<_>>().join(" | ");
            if !row_text.trim().is_empty() {
                text_content.push(row_text);
            }
        }
        let full_text = text_content.join("\n");

        let mut metadata = ChunkMetadata::for_file(path);
        metadata.extra.insert("supports_hebrew".to_string(), json!(true));
        if content.image_count > 0 {
            metadata.extra.insert("image_count".to_string(), json!(content.image_count));
        }

        let pieces = split_text(&full_text, self.chunk_size, self.chunk_overlap)?;
        debug!(path = %path.display(), chunks = pieces.len(), images = content.image_count, "extracted DOCX content");

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(idx, content)| DocumentChunk {
                content,
                metadata: metadata.clone(),
                page_number: None,
                chunk_index: idx as u32,
            })
            .collect())
    }
}
