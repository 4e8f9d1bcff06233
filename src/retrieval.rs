//! Query pipeline: embed → search → generate, with per-stage timings.
//!
//! [`QueryPipeline`] answers a natural-language query from the vector index
//! by composing an [`EmbeddingProvider`], a [`VectorIndex`], and an
//! [`AnswerGenerator`]. Collaborators are injected through the builder so
//! the pipeline stays free of process-wide state and testable with doubles.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragline::{QueryOptions, QueryPipeline, RagConfig};
//!
//! let pipeline = QueryPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .index(Arc::new(my_index))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! let result = pipeline.answer_query("How do I rotate keys?", QueryOptions::default()).await?;
//! println!("{} ({} sources)", result.answer, result.sources.len());
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::RagConfig;
use crate::document::DocumentMetadata;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::AnswerGenerator;
use crate::vectorstore::VectorIndex;

/// Answer returned when the index holds nothing relevant to the query.
///
/// A query that matches zero records resolves to this fixed message without
/// calling the generator at all, so an empty index never costs an LLM call.
pub const NO_ANSWER_MESSAGE: &str =
    "I could not find any relevant information to answer your question.";

/// Per-call options for [`QueryPipeline::answer_query`].
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Number of results to retrieve; defaults to the configured top-k.
    pub max_results: Option<usize>,
    /// Whether sources carry their recognized metadata fields.
    pub include_metadata: bool,
}

/// The recognized metadata fields exposed on a [`Source`].
///
/// This struct is the allowlist: a record's `extra` metadata never appears
/// here. When the caller does not ask for metadata the struct is present
/// but empty, never omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

impl SourceMetadata {
    /// Build the filtered external view of a record's document metadata.
    fn from_document(metadata: &DocumentMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            url: metadata.url.clone(),
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            document_type: metadata.document_type.clone(),
        }
    }
}

/// One retrieved passage backing an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Identifier of the underlying vector record.
    pub id: String,
    /// The passage text.
    pub content: String,
    /// Similarity score of the hit.
    pub score: f32,
    /// Recognized metadata fields; empty unless metadata was requested.
    pub metadata: SourceMetadata,
}

/// Per-stage timings for one query, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QueryTimings {
    pub embedding_ms: u64,
    pub search_ms: u64,
    pub generation_ms: u64,
    pub total_ms: u64,
}

/// The outcome of one retrieval-and-generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The generated answer text.
    pub answer: String,
    /// Retrieved passages in descending score order.
    pub sources: Vec<Source>,
    /// Per-stage timings.
    pub timings: QueryTimings,
    /// How many records the similarity search returned.
    pub documents_searched: usize,
    /// Identifier of the model configured for answer generation.
    pub model: String,
}

/// The retrieval orchestrator.
///
/// Construct one via [`QueryPipeline::builder()`]. Each call to
/// [`answer_query`](QueryPipeline::answer_query) is an independent unit of
/// work; the pipeline holds no mutable state and can serve concurrent calls.
pub struct QueryPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Answer a query from the indexed chunks.
    ///
    /// Embeds the query, retrieves the most similar chunks, and asks the
    /// generator to answer from those passages. If the search returns no
    /// hits, generation is skipped and the answer is [`NO_ANSWER_MESSAGE`].
    ///
    /// No stage is retried: the first collaborator failure fails the call.
    ///
    /// # Errors
    ///
    /// - [`RagError::Validation`] if `query` is blank after trimming.
    /// - [`RagError::Embedding`], [`RagError::Search`], or
    ///   [`RagError::Generation`] when the corresponding collaborator fails.
    pub async fn answer_query(&self, query: &str, options: QueryOptions) -> Result<QueryResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }

        let started = Instant::now();
        let top_k = options.max_results.unwrap_or(self.config.default_top_k);

        // 1. Embed the query
        let embed_started = Instant::now();
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;
        let embedding_ms = embed_started.elapsed().as_millis() as u64;

        // 2. Retrieve the most similar chunks
        let search_started = Instant::now();
        let hits = self.index.query(&query_embedding, top_k).await.map_err(|e| {
            error!(error = %e, "vector index query failed");
            e
        })?;
        let search_ms = search_started.elapsed().as_millis() as u64;

        // 3. Nothing indexed matches: answer without calling the generator
        if hits.is_empty() {
            let total_ms = started.elapsed().as_millis() as u64;
            info!(total_ms, "query matched no records, skipping generation");
            return Ok(QueryResult {
                answer: NO_ANSWER_MESSAGE.to_string(),
                sources: Vec::new(),
                timings: QueryTimings { embedding_ms, search_ms, generation_ms: 0, total_ms },
                documents_searched: 0,
                model: self.generator.model().to_string(),
            });
        }

        // 4. Assemble context passages from the hit payloads
        let contexts: Vec<String> = hits.iter().map(|hit| hit.payload.content.clone()).collect();

        // 5. Generate the answer
        let generation_started = Instant::now();
        let answer = self.generator.generate(query, &contexts).await.map_err(|e| {
            error!(error = %e, "answer generation failed");
            e
        })?;
        let generation_ms = generation_started.elapsed().as_millis() as u64;

        // 6. Shape sources for the caller
        let sources: Vec<Source> = hits
            .iter()
            .map(|hit| Source {
                id: hit.id.clone(),
                content: hit.payload.content.clone(),
                score: hit.score,
                metadata: if options.include_metadata {
                    SourceMetadata::from_document(&hit.payload.document)
                } else {
                    SourceMetadata::default()
                },
            })
            .collect();

        let total_ms = started.elapsed().as_millis() as u64;
        info!(documents_searched = hits.len(), total_ms, "answered query");

        Ok(QueryResult {
            answer,
            sources,
            timings: QueryTimings { embedding_ms, search_ms, generation_ms, total_ms },
            documents_searched: hits.len(),
            model: self.generator.model().to_string(),
        })
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// The collaborators are required; `config` falls back to
/// [`RagConfig::default()`] when not set.
#[derive(Default)]
pub struct QueryPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl QueryPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
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

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`QueryPipeline`], validating that all collaborators are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a collaborator is missing.
    pub fn build(self) -> Result<QueryPipeline> {
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::Config("generator is required".to_string()))?;

        Ok(QueryPipeline {
            config: self.config.unwrap_or_default(),
            embedder,
            index,
            generator,
        })
    }
}
