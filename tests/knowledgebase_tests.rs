//! End-to-end tests for the knowledge base facade, ingesting a synthetic
//! DOCX file through the real processor pipeline.

mod common;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use docbase::{DiskIndex, KbConfig, KbError, KnowledgeBase};

use common::{HashEmbedder, StubCompletions};

const DIMS: usize = 32;

/// Write a minimal DOCX archive containing the given paragraphs.
fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap();
}

async fn knowledge_base_in(data_dir: &Path, response: &str) -> KnowledgeBase {
    let config = KbConfig::builder()
        .api_key("test-key")
        .data_dir(data_dir)
        .chunk_size(50)
        .chunk_overlap(10)
        .build()
        .unwrap();

    let index =
        Arc::new(DiskIndex::open(config.index_dir(), &config.collection).await.unwrap());

    KnowledgeBase::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbedder::new(DIMS)))
        .completion_provider(Arc::new(StubCompletions::new(response)))
        .vector_index(index)
        .build()
        .unwrap()
}

#[tokio::test]
async fn add_then_list_then_delete_a_document() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("handbook.docx");
    write_docx(&source, &["The approval workflow requires two signatures.", "שלום עולם"]);

    let kb = knowledge_base_in(&dir.path().join("data"), "ok").await;

    let added = kb.add_document(&source).await.unwrap();
    assert_eq!(added.filename, "handbook.docx");
    assert!(added.chunks_added > 0);
    assert!(added.stored_path.exists());

    assert_eq!(kb.list_documents().await.unwrap(), vec!["handbook.docx"]);

    let stats = kb.stats().await.unwrap();
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.total_chunks, added.chunks_added);

    let deleted = kb.delete_document("handbook.docx").await.unwrap();
    assert_eq!(deleted.chunks_deleted, added.chunks_added);
    assert!(deleted.file_deleted);
    assert!(!added.stored_path.exists());
    assert!(kb.list_documents().await.unwrap().is_empty());
}

#[tokio::test]
async fn asking_after_ingestion_cites_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("handbook.docx");
    write_docx(&source, &["Calibration is performed monthly."]);

    let kb = knowledge_base_in(&dir.path().join("data"), "Monthly.").await;
    kb.add_document(&source).await.unwrap();

    let answer = kb.ask_question("Calibration is performed monthly.", 5).await.unwrap();
    assert_eq!(answer.answer, "Monthly.");
    assert_eq!(answer.sources[0].filename, "handbook.docx");
}

#[tokio::test]
async fn adding_a_missing_file_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let kb = knowledge_base_in(&dir.path().join("data"), "unused").await;

    let err = kb.add_document(dir.path().join("absent.pdf")).await.unwrap_err();
    assert!(matches!(err, KbError::FileNotFound { .. }));
    assert!(kb.list_documents().await.unwrap().is_empty());
}

#[tokio::test]
async fn adding_an_unsupported_format_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("notes.xyz");
    std::fs::write(&source, "plain text").unwrap();

    let kb = knowledge_base_in(&dir.path().join("data"), "unused").await;
    let err = kb.add_document(&source).await.unwrap_err();
    assert!(matches!(err, KbError::UnsupportedFormat { .. }));
}

#[tokio::test]
async fn deleting_a_document_with_no_stored_copy_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let kb = knowledge_base_in(&dir.path().join("data"), "unused").await;

    let deleted = kb.delete_document("never-ingested.pdf").await.unwrap();
    assert_eq!(deleted.chunks_deleted, 0);
    assert!(!deleted.file_deleted);
}

#[tokio::test]
async fn reingesting_the_same_filename_overwrites_the_copy() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("handbook.docx");
    write_docx(&source, &["First revision."]);

    let kb = knowledge_base_in(&dir.path().join("data"), "ok").await;
    let first = kb.add_document(&source).await.unwrap();

    write_docx(&source, &["Second revision."]);
    let second = kb.add_document(&source).await.unwrap();

    // Last write wins on the file copy; the store accumulates both
    // ingests' chunks under the same filename.
    assert_eq!(first.stored_path, second.stored_path);
    let stats = kb.stats().await.unwrap();
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.total_chunks, first.chunks_added + second.chunks_added);
}
