//! Data contracts for documents, vector records, and search hits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw source document to be ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The full text content of the document.
    pub text: String,
    /// Metadata describing the document.
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Metadata attached to a document.
///
/// The named fields are the recognized set: they are the only metadata the
/// retrieval pipeline exposes to callers when a query asks for source
/// metadata. Anything else travels in `extra` and stays internal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    /// Open extension map for fields outside the recognized set.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

/// The unit stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// Deterministic identifier, `{document_id}_chunk_{index}`.
    pub id: String,
    /// The embedding vector; its length must match the index dimensionality.
    pub embedding: Vec<f32>,
    /// Chunk content and document metadata stored alongside the vector.
    pub payload: RecordPayload,
}

impl VectorRecord {
    /// Derive the deterministic record id for one chunk of a document.
    ///
    /// Re-ingesting the same chunk yields the same id, so an upsert
    /// overwrites the previous record instead of duplicating it.
    pub fn chunk_id(document_id: &str, index: usize) -> String {
        format!("{document_id}_chunk_{index}")
    }
}

/// Content and metadata stored with a [`VectorRecord`].
///
/// `content` is required: retrieval depends on reading the chunk text back
/// out of the index. Adapters for external indexes must map a missing or
/// non-string stored content field to an empty string rather than fail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordPayload {
    /// The chunk's text content.
    pub content: String,
    /// Zero-based position of the chunk within its document.
    pub chunk_index: usize,
    /// Total number of chunks produced from the document.
    pub total_chunks: usize,
    /// Metadata inherited from the parent document.
    #[serde(default)]
    pub document: DocumentMetadata,
}

/// A single hit from a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Identifier of the matching [`VectorRecord`].
    pub id: String,
    /// Similarity score; higher is more similar.
    pub score: f32,
    /// Payload identical in shape to the stored record's.
    pub payload: RecordPayload,
}
