//! Client error types.

use serde_json::Value;
use std::fmt;
use thiserror::Error;
use wikibase_fastrun::FastRunError;
use wikibase_model::ModelError;

/// Result type for client operations.
pub type WbiResult<T> = Result<T, WbiError>;

/// Failures raised by an [`crate::ApiTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("anonymous requests are not allowed without a login")]
    AnonymousNotAllowed,

    #[error("network error: {0}")]
    Network(String),
}

/// An API response carrying an `error` object, kept whole for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorResponse(Value);

impl ApiErrorResponse {
    pub fn new(response: Value) -> Self {
        Self(response)
    }

    /// The full server response.
    pub fn response(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn code(&self) -> Option<&str> {
        self.0.pointer("/error/code").and_then(Value::as_str)
    }

    pub fn info(&self) -> Option<&str> {
        self.0.pointer("/error/info").and_then(Value::as_str)
    }

    /// The `name` of every entry in `error.messages`.
    pub fn message_names(&self) -> Vec<&str> {
        self.messages()
            .filter_map(|m| m.get("name").and_then(Value::as_str))
            .collect()
    }

    /// Language of a label/description conflict.
    pub fn language(&self) -> Option<&str> {
        self.first_parameter(1)
    }

    /// Id of the entity already holding the conflicting label/description pair.
    ///
    /// The server reports it as a wiki link such as `[[Item:Q42|Q42]]`.
    pub fn conflicting_entity_id(&self) -> Option<&str> {
        let link = self.first_parameter(2)?;
        let inner = link.trim_start_matches("[[").trim_end_matches("]]");
        let id = match inner.split_once('|') {
            Some((_, label)) => label,
            None => inner.rsplit(':').next().unwrap_or(inner),
        };
        (!id.is_empty()).then_some(id)
    }

    fn messages(&self) -> impl Iterator<Item = &Value> {
        self.0
            .pointer("/error/messages")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    }

    fn first_parameter(&self, index: usize) -> Option<&str> {
        self.messages()
            .next()?
            .get("parameters")?
            .get(index)?
            .as_str()
    }
}

impl fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code().unwrap_or("unknown"),
            self.info().unwrap_or("no details")
        )
    }
}

/// Errors that can occur in client operations.
#[derive(Debug, Error)]
pub enum WbiError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("client is in search-only mode; writes are disabled")]
    SearchOnly,

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("label and description pair already in use: {0}")]
    NonUniqueLabelDescriptionPair(ApiErrorResponse),

    #[error("API error: {0}")]
    GenericApi(ApiErrorResponse),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("fast run error: {0}")]
    FastRun(#[from] FastRunError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ModelError> for WbiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidArgument(msg) => WbiError::InvalidArgument(msg),
            ModelError::MalformedData(msg) => WbiError::MalformedData(msg),
            ModelError::NotFound(id) => WbiError::NotFound(id),
        }
    }
}

impl WbiError {
    /// The server response behind an API-reported failure.
    pub fn api_response(&self) -> Option<&ApiErrorResponse> {
        match self {
            WbiError::NonUniqueLabelDescriptionPair(r) | WbiError::GenericApi(r) => Some(r),
            _ => None,
        }
    }
}
