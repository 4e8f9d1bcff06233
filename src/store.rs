//! Persistence collaborator interface for documents and job records.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;
use crate::ingestion::IngestionJobResult;

/// The relational-store collaborator backing ingestion bookkeeping.
///
/// [`mark_indexed`](DocumentStore::mark_indexed) and
/// [`record_job`](DocumentStore::record_job) are fire-and-forget from the
/// pipeline's point of view: the ingestion orchestrator logs their failures
/// and never lets them affect a job result, since the chunk data is already
/// durable in the vector index by the time they run.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List documents that have not yet been indexed.
    async fn fetch_unprocessed(&self) -> Result<Vec<Document>>;

    /// Mark a document as indexed after its chunks are stored.
    async fn mark_indexed(&self, document_id: &str) -> Result<()>;

    /// Persist the summary of a completed ingestion run.
    async fn record_job(&self, result: &IngestionJobResult) -> Result<()>;
}
