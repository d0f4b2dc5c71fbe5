//! Error types for the fast-run cache.

use thiserror::Error;

/// Result type for fast-run operations.
pub type FastRunResult<T> = Result<T, FastRunError>;

/// Errors that can occur while loading or consulting a baseline.
#[derive(Debug, Error)]
pub enum FastRunError {
    /// The baseline source failed to answer.
    #[error("baseline query failed: {0}")]
    Baseline(String),

    /// The baseline source answered with something undecodable.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
