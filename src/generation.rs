//! Answer generation collaborator interface.

use async_trait::async_trait;

use crate::error::Result;

/// A collaborator that produces a natural-language answer from a query and
/// a list of retrieved context passages.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer to `query` grounded in `contexts`.
    async fn generate(&self, query: &str, contexts: &[String]) -> Result<String>;

    /// Identifier of the underlying model, reported in query results.
    fn model(&self) -> &str;
}
