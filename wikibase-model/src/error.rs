//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or hydrating model types.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The caller passed input the model cannot act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wire data does not fit the model.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// The payload carries the `missing` marker.
    #[error("entity does not exist: {0}")]
    NotFound(String),
}

impl ModelError {
    pub(crate) fn malformed(context: &str, err: serde_json::Error) -> Self {
        ModelError::MalformedData(format!("{context}: {err}"))
    }
}
