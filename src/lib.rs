//! # ragline
//!
//! A minimal retrieval-augmented generation (RAG) pipeline: ingest raw
//! documents into a vector index, then answer natural-language queries from
//! the indexed chunks with an LLM.
//!
//! ## Overview
//!
//! The crate is built around two orchestrators that share a small set of
//! collaborator traits:
//!
//! - [`IngestionPipeline`] — chunk → batch-embed → upsert. Per-document
//!   failures are captured in the returned [`IngestionJobResult`] instead of
//!   aborting the batch.
//! - [`QueryPipeline`] — embed → search → generate. Returns a
//!   [`QueryResult`] with the answer, its sources, and per-stage timings. A
//!   query that matches nothing short-circuits to a fixed answer without
//!   calling the LLM.
//!
//! The collaborators — [`EmbeddingProvider`], [`VectorIndex`],
//! [`AnswerGenerator`], [`DocumentStore`] — are external services reached
//! through narrow async traits. Construct them once at your composition
//! root and hand them to the pipeline builders; the pipelines themselves
//! hold no hidden process-wide state.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use ragline::{
//!     Document, IngestionPipeline, InMemoryVectorIndex, QueryOptions, QueryPipeline, RagConfig,
//! };
//!
//! let config = RagConfig::default();
//! let index = Arc::new(InMemoryVectorIndex::new());
//!
//! let ingestion = IngestionPipeline::builder()
//!     .config(config.clone())
//!     .embedder(embedder.clone())
//!     .index(index.clone())
//!     .store(store)
//!     .build()?;
//!
//! let job = ingestion.run_job(&documents).await;
//! assert!(job.success);
//!
//! let queries = QueryPipeline::builder()
//!     .config(config)
//!     .embedder(embedder)
//!     .index(index)
//!     .generator(generator)
//!     .build()?;
//!
//! let result = queries.answer_query("How do I rotate keys?", QueryOptions::default()).await?;
//! println!("{}", result.answer);
//! ```
//!
//! ## Features
//!
//! - `openai` — [`OpenAiEmbeddings`](openai::OpenAiEmbeddings) and
//!   [`OpenAiGenerator`](openai::OpenAiGenerator), reqwest-based adapters
//!   for the OpenAI embeddings and chat completions APIs.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod retrieval;
pub mod store;
pub mod vectorstore;

pub use chunking::{Chunker, WordChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Document, DocumentMetadata, RecordPayload, SearchResult, VectorRecord};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::AnswerGenerator;
pub use ingestion::{
    IngestionError, IngestionJobResult, IngestionPipeline, IngestionPipelineBuilder,
};
pub use inmemory::InMemoryVectorIndex;
pub use retrieval::{
    NO_ANSWER_MESSAGE, QueryOptions, QueryPipeline, QueryPipelineBuilder, QueryResult,
    QueryTimings, Source, SourceMetadata,
};
pub use store::DocumentStore;
pub use vectorstore::VectorIndex;
