//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration shared by the ingestion and retrieval pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters used during ingestion.
    pub max_chunk_size: usize,
    /// Number of results a query retrieves when the caller does not ask
    /// for a specific count.
    pub default_top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { max_chunk_size: 1000, default_top_k: 5 }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Set the default number of results retrieved per query.
    pub fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `max_chunk_size` or `default_top_k`
    /// is zero.
    pub fn build(self) -> Result<RagConfig> {
        if self.config.max_chunk_size == 0 {
            return Err(RagError::Config("max_chunk_size must be greater than zero".to_string()));
        }
        if self.config.default_top_k == 0 {
            return Err(RagError::Config("default_top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
