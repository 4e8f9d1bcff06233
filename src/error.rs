//! Error types for the `ragline` crate.

use thiserror::Error;

/// Errors that can occur in pipeline operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The caller supplied invalid input, e.g. a blank query.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The embedding collaborator failed.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index failed while executing a similarity query.
    #[error("Search error ({backend}): {message}")]
    Search {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index failed while upserting records.
    #[error("Upsert error ({backend}): {message}")]
    Upsert {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The answer generator failed.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The document/job persistence collaborator failed.
    #[error("Store error ({store}): {message}")]
    Store {
        /// The store that produced the error.
        store: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
