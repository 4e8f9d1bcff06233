#![allow(dead_code)]

//! Hand-rolled counting doubles for the pipeline tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragline::{
    AnswerGenerator, Document, DocumentStore, EmbeddingProvider, IngestionJobResult, RagError,
    RecordPayload, Result, SearchResult, VectorIndex, VectorRecord,
};

pub const DIM: usize = 8;

/// Deterministic embedding derived from the text bytes.
pub fn embedding_for(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for (i, b) in text.bytes().enumerate() {
        v[i % DIM] += b as f32;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Embedding provider double with call counting and scripted failure.
#[derive(Default)]
pub struct StubEmbedder {
    pub embed_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    /// Any call whose input text contains this marker fails.
    pub fail_marker: Option<String>,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &str) -> Self {
        Self { fail_marker: Some(marker.to_string()), ..Self::default() }
    }

    fn check(&self, text: &str) -> Result<()> {
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(RagError::Embedding {
                    provider: "stub".to_string(),
                    message: format!("refusing to embed text containing '{marker}'"),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.check(text)?;
        Ok(embedding_for(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        for text in texts {
            self.check(text)?;
        }
        Ok(texts.iter().map(|t| embedding_for(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Vector index double that records upsert batches and replays scripted hits.
#[derive(Default)]
pub struct RecordingIndex {
    pub upsert_batches: Mutex<Vec<Vec<VectorRecord>>>,
    pub query_calls: AtomicUsize,
    pub hits: Mutex<Vec<SearchResult>>,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(hits: Vec<SearchResult>) -> Self {
        Self { hits: Mutex::new(hits), ..Self::default() }
    }

    /// All records across every upsert call, in call order.
    pub fn upserted(&self) -> Vec<VectorRecord> {
        self.upsert_batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl VectorIndex for RecordingIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        self.upsert_batches.lock().unwrap().push(records.to_vec());
        Ok(records.len())
    }

    async fn query(&self, _embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let hits = self.hits.lock().unwrap();
        Ok(hits.iter().take(top_k).cloned().collect())
    }
}

/// Answer generator double with call counting.
pub struct CountingGenerator {
    pub calls: AtomicUsize,
    pub answer: String,
    /// Context passages seen by the most recent call.
    pub seen_contexts: Mutex<Vec<String>>,
}

impl CountingGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer: answer.to_string(),
            seen_contexts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnswerGenerator for CountingGenerator {
    async fn generate(&self, _query: &str, contexts: &[String]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_contexts.lock().unwrap() = contexts.to_vec();
        Ok(self.answer.clone())
    }

    fn model(&self) -> &str {
        "test-model"
    }
}

/// Document store double with scripted failures.
#[derive(Default)]
pub struct RecordingStore {
    pub unprocessed: Mutex<Vec<Document>>,
    pub marked: Mutex<Vec<String>>,
    pub jobs: Mutex<Vec<IngestionJobResult>>,
    pub fail_bookkeeping: bool,
    pub fail_listing: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unprocessed(documents: Vec<Document>) -> Self {
        Self { unprocessed: Mutex::new(documents), ..Self::default() }
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn fetch_unprocessed(&self) -> Result<Vec<Document>> {
        if self.fail_listing {
            return Err(RagError::Store {
                store: "stub".to_string(),
                message: "listing unavailable".to_string(),
            });
        }
        Ok(self.unprocessed.lock().unwrap().clone())
    }

    async fn mark_indexed(&self, document_id: &str) -> Result<()> {
        if self.fail_bookkeeping {
            return Err(RagError::Store {
                store: "stub".to_string(),
                message: "write refused".to_string(),
            });
        }
        self.marked.lock().unwrap().push(document_id.to_string());
        Ok(())
    }

    async fn record_job(&self, result: &IngestionJobResult) -> Result<()> {
        if self.fail_bookkeeping {
            return Err(RagError::Store {
                store: "stub".to_string(),
                message: "write refused".to_string(),
            });
        }
        self.jobs.lock().unwrap().push(result.clone());
        Ok(())
    }
}

/// Build a search hit with the given id, content, and score.
pub fn hit(id: &str, content: &str, score: f32) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        score,
        payload: RecordPayload {
            content: content.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            document: Default::default(),
        },
    }
}
