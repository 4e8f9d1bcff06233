//! Embedding collaborator interface.

use async_trait::async_trait;

use crate::error::Result;

/// A collaborator that turns text into fixed-length embedding vectors.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. [`embed_batch`](EmbeddingProvider::embed_batch) must return
/// one vector per input, in input order — ingestion pairs chunks with their
/// embeddings by position.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, index-aligned with the input.
    ///
    /// The default implementation embeds each text sequentially. Backends
    /// with native batch endpoints should override it so a whole document
    /// costs one call instead of one per chunk.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Dimensionality of the vectors this provider produces.
    fn dimensions(&self) -> usize;
}
