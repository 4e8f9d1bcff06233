//! Vector index collaborator interface.

use async_trait::async_trait;

use crate::document::{SearchResult, VectorRecord};
use crate::error::Result;

/// An external store of embedding vectors with similarity search.
///
/// The pipeline only ever writes whole-document batches of records and
/// reads top-k hits; collection management, replication, and consistency
/// are the backend's concern.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.upsert(&records).await?;
/// let hits = index.query(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records by id.
    ///
    /// Returns the number of records upserted.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Return the `top_k` records most similar to `embedding`, ordered by
    /// descending score.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;
}
