//! Ingestion pipeline: chunk → batch-embed → upsert, with per-document
//! failure isolation.
//!
//! [`IngestionPipeline`] turns raw [`Document`]s into indexed vector
//! records. One document failing never aborts the batch: the failure is
//! captured in the returned [`IngestionJobResult`] and the run continues
//! with the next document.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragline::{IngestionPipeline, RagConfig};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .index(Arc::new(my_index))
//!     .store(Arc::new(my_store))
//!     .build()?;
//!
//! let result = pipeline.run_pending().await;
//! println!("{} processed, {} failed", result.documents_processed, result.errors.len());
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::chunking::{Chunker, WordChunker};
use crate::config::RagConfig;
use crate::document::{Document, RecordPayload, VectorRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::store::DocumentStore;
use crate::vectorstore::VectorIndex;

/// A per-document failure captured during an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionError {
    /// Identifier of the document that failed.
    pub document_id: String,
    /// A description of the failure.
    pub message: String,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionJobResult {
    /// Run-unique identifier, derived from the start time.
    pub job_id: String,
    /// Documents fully chunked, embedded, and upserted.
    pub documents_processed: usize,
    /// Per-document failures, in input order.
    pub errors: Vec<IngestionError>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// True iff no document failed.
    pub success: bool,
}

/// The ingestion orchestrator.
///
/// Construct one via [`IngestionPipeline::builder()`]. Documents are
/// processed sequentially and independently; each costs exactly one
/// embedding call and one upsert call regardless of its chunk count.
pub struct IngestionPipeline {
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn DocumentStore>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Fetch unprocessed documents from the store and ingest them.
    ///
    /// A failure to list documents is soft: it is logged and treated as an
    /// empty batch, so a flaky source still yields a job result.
    pub async fn run_pending(&self) -> IngestionJobResult {
        let documents = match self.store.fetch_unprocessed().await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "listing unprocessed documents failed, treating as empty");
                Vec::new()
            }
        };
        self.run_job(&documents).await
    }

    /// Ingest a batch of documents and return the job summary.
    ///
    /// Never fails as a whole: per-document failures are captured in
    /// [`IngestionJobResult::errors`] and the remaining documents are still
    /// processed. Record ids are deterministic (`{document_id}_chunk_{i}`),
    /// so re-running a job on unchanged documents overwrites rather than
    /// duplicates. A document that shrank since its last run leaves its
    /// stale trailing chunk records in the index; schedule a full re-index
    /// to reclaim them.
    pub async fn run_job(&self, documents: &[Document]) -> IngestionJobResult {
        let started = Instant::now();
        let job_id = format!("job_{}", Utc::now().timestamp_millis());

        if documents.is_empty() {
            info!(%job_id, "ingestion job had no documents");
            return IngestionJobResult {
                job_id,
                documents_processed: 0,
                errors: Vec::new(),
                duration_ms: started.elapsed().as_millis() as u64,
                success: true,
            };
        }

        let mut processed = 0;
        let mut errors = Vec::new();

        for document in documents {
            match self.ingest_document(document).await {
                Ok(chunk_count) => {
                    processed += 1;
                    best_effort("mark_indexed", self.store.mark_indexed(&document.id)).await;
                    info!(document.id = %document.id, chunk_count, "ingested document");
                }
                Err(e) => {
                    error!(document.id = %document.id, error = %e, "document ingestion failed");
                    errors.push(IngestionError {
                        document_id: document.id.clone(),
                        message: e.to_string(),
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        let result = IngestionJobResult {
            job_id,
            documents_processed: processed,
            success: errors.is_empty(),
            errors,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        best_effort("record_job", self.store.record_job(&result)).await;

        info!(
            job_id = %result.job_id,
            processed = result.documents_processed,
            failed = result.errors.len(),
            duration_ms = result.duration_ms,
            "ingestion job finished"
        );

        result
    }

    /// Chunk, embed, and upsert a single document. Returns the chunk count.
    async fn ingest_document(&self, document: &Document) -> Result<usize> {
        // 1. Chunk the document text
        let chunks = self.chunker.chunk(&document.text);
        if chunks.is_empty() {
            return Ok(0);
        }
        let total_chunks = chunks.len();

        // 2. One embedding call for the whole document
        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != total_chunks {
            return Err(RagError::Embedding {
                provider: "embed_batch".to_string(),
                message: format!(
                    "batch returned {} embeddings for {total_chunks} chunks",
                    embeddings.len()
                ),
            });
        }

        // 3. Build index-aligned records
        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (content, embedding))| VectorRecord {
                id: VectorRecord::chunk_id(&document.id, index),
                embedding,
                payload: RecordPayload {
                    content,
                    chunk_index: index,
                    total_chunks,
                    document: document.metadata.clone(),
                },
            })
            .collect();

        // 4. One upsert call for the whole document
        self.index.upsert(&records).await?;

        Ok(total_chunks)
    }
}

/// Run a bookkeeping future, logging failure instead of propagating it.
async fn best_effort(operation: &str, fut: impl Future<Output = Result<()>>) {
    if let Err(e) = fut.await {
        warn!(operation, error = %e, "bookkeeping write failed");
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedder`, `index`, and `store` are required. `config` falls back to
/// [`RagConfig::default()`]; `chunker` falls back to a [`WordChunker`]
/// sized by the configuration.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    store: Option<Arc<dyn DocumentStore>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the chunker, replacing the default [`WordChunker`].
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the document/job store.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the [`IngestionPipeline`], validating that all required
    /// collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required collaborator is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;

        let config = self.config.unwrap_or_default();
        let chunker =
            self.chunker.unwrap_or_else(|| Arc::new(WordChunker::new(config.max_chunk_size)));

        Ok(IngestionPipeline { chunker, embedder, index, store })
    }
}
