//! Ingestion pipeline behavior: index alignment, per-document failure
//! isolation, idempotent re-runs, and best-effort bookkeeping.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{RecordingIndex, RecordingStore, StubEmbedder, embedding_for};
use ragline::{
    Chunker, Document, DocumentMetadata, IngestionPipeline, InMemoryVectorIndex, RagConfig,
    VectorIndex, WordChunker,
};

const CHUNK_SIZE: usize = 20;

fn doc(id: &str, text: &str) -> Document {
    Document { id: id.to_string(), text: text.to_string(), metadata: DocumentMetadata::default() }
}

fn config() -> RagConfig {
    RagConfig::builder().max_chunk_size(CHUNK_SIZE).default_top_k(5).build().unwrap()
}

fn build_pipeline(
    embedder: Arc<StubEmbedder>,
    index: Arc<dyn VectorIndex>,
    store: Arc<RecordingStore>,
) -> IngestionPipeline {
    IngestionPipeline::builder()
        .config(config())
        .embedder(embedder)
        .index(index)
        .store(store)
        .build()
        .unwrap()
}

#[tokio::test]
async fn empty_batch_returns_immediately() {
    let store = Arc::new(RecordingStore::new());
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        Arc::new(RecordingIndex::new()),
        store.clone(),
    );

    let result = pipeline.run_job(&[]).await;

    assert_eq!(result.documents_processed, 0);
    assert!(result.errors.is_empty());
    assert!(result.success);
    assert!(store.jobs.lock().unwrap().is_empty(), "no job record for an empty batch");
}

#[tokio::test]
async fn records_are_index_aligned_with_batch_output() {
    let embedder = Arc::new(StubEmbedder::new());
    let index = Arc::new(RecordingIndex::new());
    let store = Arc::new(RecordingStore::new());
    let pipeline = build_pipeline(embedder.clone(), index.clone(), store);

    let text = "alpha beta gamma delta epsilon zeta eta theta iota";
    let expected_chunks = WordChunker::new(CHUNK_SIZE).chunk(text);
    assert!(expected_chunks.len() > 1, "test text must span several chunks");

    let result = pipeline.run_job(&[doc("doc1", text)]).await;
    assert!(result.success);

    // One embedding call and one upsert call for the whole document
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    let batches = index.upsert_batches.lock().unwrap();
    assert_eq!(batches.len(), 1);

    let records = &batches[0];
    assert_eq!(records.len(), expected_chunks.len());
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.id, format!("doc1_chunk_{i}"));
        assert_eq!(record.embedding, embedding_for(&expected_chunks[i]));
        assert_eq!(record.payload.content, expected_chunks[i]);
        assert_eq!(record.payload.chunk_index, i);
        assert_eq!(record.payload.total_chunks, expected_chunks.len());
    }
}

#[tokio::test]
async fn failing_document_does_not_abort_the_batch() {
    let embedder = Arc::new(StubEmbedder::failing_on("kaboom"));
    let index = Arc::new(RecordingIndex::new());
    let store = Arc::new(RecordingStore::new());
    let pipeline = build_pipeline(embedder, index.clone(), store.clone());

    let documents = vec![
        doc("doc1", "first document text"),
        doc("doc2", "this one goes kaboom"),
        doc("doc3", "third document text"),
    ];
    let result = pipeline.run_job(&documents).await;

    assert_eq!(result.documents_processed, 2);
    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].document_id, "doc2");
    assert!(result.errors[0].message.contains("kaboom"));

    let upserted_ids: Vec<String> = index.upserted().iter().map(|r| r.id.clone()).collect();
    assert!(upserted_ids.iter().any(|id| id.starts_with("doc1_chunk_")));
    assert!(upserted_ids.iter().any(|id| id.starts_with("doc3_chunk_")));
    assert!(!upserted_ids.iter().any(|id| id.starts_with("doc2_chunk_")));

    assert_eq!(*store.marked.lock().unwrap(), vec!["doc1".to_string(), "doc3".to_string()]);
}

#[tokio::test]
async fn errors_preserve_input_order() {
    let embedder = Arc::new(StubEmbedder::failing_on("kaboom"));
    let pipeline =
        build_pipeline(embedder, Arc::new(RecordingIndex::new()), Arc::new(RecordingStore::new()));

    let documents = vec![
        doc("doc1", "kaboom early"),
        doc("doc2", "fine text"),
        doc("doc3", "kaboom late"),
    ];
    let result = pipeline.run_job(&documents).await;

    let failed: Vec<&str> = result.errors.iter().map(|e| e.document_id.as_str()).collect();
    assert_eq!(failed, ["doc1", "doc3"]);
}

#[tokio::test]
async fn rerunning_an_unchanged_document_overwrites_records() {
    let index = Arc::new(InMemoryVectorIndex::new());
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        index.clone(),
        Arc::new(RecordingStore::new()),
    );

    let text = "alpha beta gamma delta epsilon zeta";
    let chunk_count = WordChunker::new(CHUNK_SIZE).chunk(text).len();
    let documents = vec![doc("doc1", text)];

    let first = pipeline.run_job(&documents).await;
    let second = pipeline.run_job(&documents).await;

    assert!(first.success && second.success);
    assert_eq!(index.len().await, chunk_count, "re-ingestion must not duplicate records");

    let hits = index.query(&embedding_for("alpha beta gamma"), chunk_count).await.unwrap();
    for hit in hits {
        assert!(hit.id.starts_with("doc1_chunk_"));
    }
}

#[tokio::test]
async fn rerun_produces_identical_batches() {
    let index = Arc::new(RecordingIndex::new());
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        index.clone(),
        Arc::new(RecordingStore::new()),
    );

    let documents = vec![doc("doc1", "alpha beta gamma delta epsilon zeta")];
    pipeline.run_job(&documents).await;
    pipeline.run_job(&documents).await;

    let batches = index.upsert_batches.lock().unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0], batches[1], "re-run must upsert the same ids and content");
}

#[tokio::test]
async fn document_with_no_text_counts_as_processed() {
    let index = Arc::new(RecordingIndex::new());
    let store = Arc::new(RecordingStore::new());
    let pipeline = build_pipeline(Arc::new(StubEmbedder::new()), index.clone(), store.clone());

    let result = pipeline.run_job(&[doc("doc1", "   ")]).await;

    assert_eq!(result.documents_processed, 1);
    assert!(result.success);
    assert!(index.upsert_batches.lock().unwrap().is_empty());
    assert_eq!(*store.marked.lock().unwrap(), vec!["doc1".to_string()]);
}

#[tokio::test]
async fn bookkeeping_failure_is_not_escalated() {
    let store = Arc::new(RecordingStore { fail_bookkeeping: true, ..Default::default() });
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        Arc::new(RecordingIndex::new()),
        store.clone(),
    );

    let result = pipeline.run_job(&[doc("doc1", "some document text")]).await;

    assert_eq!(result.documents_processed, 1);
    assert!(result.success);
    assert!(result.errors.is_empty());
    assert!(store.jobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn job_result_is_recorded_in_the_store() {
    let store = Arc::new(RecordingStore::new());
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        Arc::new(RecordingIndex::new()),
        store.clone(),
    );

    let result = pipeline.run_job(&[doc("doc1", "some document text")]).await;

    let jobs = store.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_id, result.job_id);
    assert_eq!(jobs[0].documents_processed, 1);
}

#[tokio::test]
async fn run_pending_ingests_the_store_listing() {
    let store =
        Arc::new(RecordingStore::with_unprocessed(vec![doc("doc1", "pending document text")]));
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        Arc::new(RecordingIndex::new()),
        store.clone(),
    );

    let result = pipeline.run_pending().await;

    assert_eq!(result.documents_processed, 1);
    assert!(result.success);
    assert_eq!(*store.marked.lock().unwrap(), vec!["doc1".to_string()]);
}

#[tokio::test]
async fn run_pending_treats_listing_failure_as_empty() {
    let store = Arc::new(RecordingStore { fail_listing: true, ..Default::default() });
    let pipeline = build_pipeline(
        Arc::new(StubEmbedder::new()),
        Arc::new(RecordingIndex::new()),
        store,
    );

    let result = pipeline.run_pending().await;

    assert_eq!(result.documents_processed, 0);
    assert!(result.success);
}
