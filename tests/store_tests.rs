//! Integration tests for the knowledge store over the disk index.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use docbase::{DiskIndex, EmbeddingProvider, KbError, KnowledgeStore, MetadataValue, VectorIndex};

use common::{HashEmbedder, make_chunk};

const DIMS: usize = 32;

async fn store_in(dir: &std::path::Path) -> (KnowledgeStore, Arc<HashEmbedder>) {
    let embedder = Arc::new(HashEmbedder::new(DIMS));
    let index = Arc::new(DiskIndex::open(dir, "knowledge_base").await.unwrap());
    (KnowledgeStore::new(embedder.clone(), index), embedder)
}

#[tokio::test]
async fn empty_input_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let (store, embedder) = store_in(dir.path()).await;

    let ids = store.add_chunks(&[]).await.unwrap();
    assert!(ids.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn round_trip_ranks_identical_content_first() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    let c1 = make_chunk("a.pdf", "the approval workflow requires two signatures", Some(1), 0);
    let c2 = make_chunk("b.pdf", "zzz completely unrelated content zzz", Some(1), 0);
    let ids = store.add_chunks(&[c1.clone(), c2]).await.unwrap();
    assert_eq!(ids.len(), 2);

    let results = store.search(&c1.content, 2, None).await.unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].content, c1.content);
    assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn search_on_empty_store_returns_empty_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    let results = store.search("anything", 5, None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn filtered_search_matches_metadata_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    store
        .add_chunks(&[
            make_chunk("a.pdf", "shared phrasing about processes", Some(1), 0),
            make_chunk("b.pdf", "shared phrasing about processes", Some(1), 0),
        ])
        .await
        .unwrap();

    let filter = [("filename".to_string(), MetadataValue::from("a.pdf"))].into();
    let results = store.search("shared phrasing", 10, Some(&filter)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].metadata.get("filename"),
        Some(&MetadataValue::from("a.pdf"))
    );

    let no_match = [("filename".to_string(), MetadataValue::from("c.pdf"))].into();
    assert!(store.search("shared phrasing", 10, Some(&no_match)).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_documents_is_alphabetical_and_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    store
        .add_chunks(&[
            make_chunk("beta.docx", "one", None, 0),
            make_chunk("alpha.pdf", "two", Some(1), 0),
            make_chunk("alpha.pdf", "three", Some(2), 0),
        ])
        .await
        .unwrap();

    let documents = store.list_documents().await.unwrap();
    assert_eq!(documents, vec!["alpha.pdf", "beta.docx"]);
}

#[tokio::test]
async fn deletion_is_complete() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    store
        .add_chunks(&[
            make_chunk("doomed.pdf", "first chunk of the doomed file", Some(1), 0),
            make_chunk("doomed.pdf", "second chunk of the doomed file", Some(2), 0),
            make_chunk("keeper.pdf", "this one stays", Some(1), 0),
        ])
        .await
        .unwrap();

    let removed = store.delete_document("doomed.pdf").await.unwrap();
    assert_eq!(removed, 2);

    let documents = store.list_documents().await.unwrap();
    assert_eq!(documents, vec!["keeper.pdf"]);

    let results = store.search("doomed file", 10, None).await.unwrap();
    assert!(results.iter().all(|r| {
        r.metadata.get("filename") != Some(&MetadataValue::from("doomed.pdf"))
    }));
}

#[tokio::test]
async fn deleting_an_unknown_document_returns_zero() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;
    assert_eq!(store.delete_document("never-added.pdf").await.unwrap(), 0);
}

#[tokio::test]
async fn stats_are_internally_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    store
        .add_chunks(&[
            make_chunk("a.pdf", "alpha one", Some(1), 0),
            make_chunk("a.pdf", "alpha two", Some(2), 0),
            make_chunk("b.docx", "beta one", None, 0),
        ])
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_chunks, 3);
    assert_eq!(stats.total_documents, stats.documents.len());
    assert!(stats.total_chunks >= stats.total_documents);
    assert_eq!(stats.documents, vec!["a.pdf", "b.docx"]);
}

#[tokio::test]
async fn readding_identical_content_duplicates_records() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    let chunk = make_chunk("dup.pdf", "same content", Some(1), 0);
    let first = store.add_chunks(std::slice::from_ref(&chunk)).await.unwrap();
    let second = store.add_chunks(std::slice::from_ref(&chunk)).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(store.stats().await.unwrap().total_chunks, 2);
}

#[tokio::test]
async fn invalid_metadata_fails_before_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let (store, embedder) = store_in(dir.path()).await;

    let mut chunk = make_chunk("bad.pdf", "content", Some(1), 0);
    chunk.metadata.extra.insert("nested".to_string(), serde_json::json!({"a": 1}));

    let err = store.add_chunks(&[chunk]).await.unwrap_err();
    assert!(matches!(err, KbError::InvalidMetadata { .. }));
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn disk_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (store, _) = store_in(dir.path()).await;
        store
            .add_chunks(&[make_chunk("persisted.pdf", "durable content", Some(1), 0)])
            .await
            .unwrap();
    }

    let reopened = DiskIndex::open(dir.path(), "knowledge_base").await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), 1);

    let embedder = Arc::new(HashEmbedder::new(DIMS));
    let store = KnowledgeStore::new(embedder, Arc::new(reopened));
    let results = store.search("durable content", 1, None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "durable content");
}

#[tokio::test]
async fn failed_persist_leaves_no_trace_of_the_add() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;

    // Occupy the temp file path with a directory so the index cannot
    // write its state to disk.
    std::fs::create_dir(dir.path().join("knowledge_base.json.tmp")).unwrap();

    let err = store
        .add_chunks(&[make_chunk("ghost.pdf", "ghost content", Some(1), 0)])
        .await
        .unwrap_err();
    assert!(matches!(err, KbError::StoreWriteFailed { .. }));

    // A failed add must not leave the chunks searchable in memory.
    assert!(store.search("ghost content", 5, None).await.unwrap().is_empty());
    assert_eq!(store.stats().await.unwrap().total_chunks, 0);
}

#[tokio::test]
async fn failed_persist_leaves_deleted_records_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;
    store.add_chunks(&[make_chunk("keep.pdf", "still here", Some(1), 0)]).await.unwrap();

    std::fs::create_dir(dir.path().join("knowledge_base.json.tmp")).unwrap();

    let err = store.delete_document("keep.pdf").await.unwrap_err();
    assert!(matches!(err, KbError::StoreWriteFailed { .. }));

    // The failed delete removed nothing; the record stays searchable.
    let results = store.search("still here", 5, None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(store.stats().await.unwrap().total_chunks, 1);
}

/// Declares one dimensionality but returns narrower vectors.
struct WrongWidthEmbedder;

#[async_trait]
impl EmbeddingProvider for WrongWidthEmbedder {
    async fn embed_query(&self, _text: &str) -> docbase::Result<Vec<f32>> {
        Ok(vec![1.0; DIMS])
    }

    async fn embed_documents(&self, texts: &[&str]) -> docbase::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0; DIMS / 2]).collect())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

#[tokio::test]
async fn vectors_narrower_than_declared_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let index = Arc::new(DiskIndex::open(dir.path(), "knowledge_base").await.unwrap());
    let store = KnowledgeStore::new(Arc::new(WrongWidthEmbedder), index);

    let err =
        store.add_chunks(&[make_chunk("a.pdf", "content", Some(1), 0)]).await.unwrap_err();
    assert!(matches!(err, KbError::StoreWriteFailed { .. }));
    assert_eq!(store.stats().await.unwrap().total_chunks, 0);
}

#[tokio::test]
async fn mismatched_dimensions_are_rejected_by_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = store_in(dir.path()).await;
    store.add_chunks(&[make_chunk("a.pdf", "seed", Some(1), 0)]).await.unwrap();

    // A second store over the same collection with a different embedding
    // dimensionality must fail to write, not corrupt the collection.
    let narrow = Arc::new(HashEmbedder::new(DIMS / 2));
    let index = Arc::new(DiskIndex::open(dir.path(), "knowledge_base").await.unwrap());
    let other = KnowledgeStore::new(narrow, index);

    let err = other.add_chunks(&[make_chunk("b.pdf", "bad dims", Some(1), 0)]).await.unwrap_err();
    assert!(matches!(err, KbError::StoreWriteFailed { .. }));
}
