//! Error types for the documentation QA pipeline

use thiserror::Error;

/// Result type alias for QA operations
pub type Result<T> = std::result::Result<T, Error>;

/// QA pipeline errors
///
/// Failures bubble to the caller unmodified; the pipeline performs no
/// automatic retries. The no-evidence case is not an error and is handled
/// with a fixed low-confidence answer instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query planning failed
    #[error("Query planning failed: {0}")]
    Planning(String),

    /// Retrieval failed for one or more queries
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Chunk-to-document aggregation failed
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    /// Model call failed or returned a payload that cannot be coerced
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a planning error
    pub fn planning(message: impl Into<String>) -> Self {
        Self::Planning(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create an aggregation error
    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation(message.into())
    }

    /// Create a synthesis error
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis(message.into())
    }
}
