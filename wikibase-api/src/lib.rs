//! Client side of a Wikibase instance: configuration, the action API
//! transport, and entity handles that read, compare and write entities.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wikibase_api::{WbiConfig, WbiResult, WikibaseClient, WikibaseEntity};
//! use wikibase_model::{ActionIfExists, Claim, EntityType};
//!
//! async fn create_book(title: &str) -> WbiResult<Option<String>> {
//!     let client = Arc::new(WikibaseClient::with_http(WbiConfig::default())?);
//!     let mut book = WikibaseEntity::new(client, EntityType::Item);
//!     book.add_claims(Claim::string("P1476", title), ActionIfExists::Append)?;
//!     book.write("create book", true).await?;
//!     Ok(book.id().map(str::to_string))
//! }
//! ```
//!
//! # Write pipeline
//!
//! [`WikibaseEntity::write_data`] refuses to write for search-only clients or
//! empty data, serializes the `wbeditentity` request (`id` for saved entities,
//! `new` otherwise), submits it through the [`ApiTransport`] and classifies the
//! response. Label/description conflicts surface as
//! [`WbiError::NonUniqueLabelDescriptionPair`], any other API error as
//! [`WbiError::GenericApi`]; both carry the full response. Failures are logged
//! and returned; the entity is only updated on success.

mod client;
mod config;
mod entity;
mod error;
mod http;
pub mod transport;
mod write;

pub use client::WikibaseClient;
pub use config::WbiConfig;
pub use entity::WikibaseEntity;
pub use error::{ApiErrorResponse, TransportError, WbiError, WbiResult};
pub use http::HttpTransport;
pub use transport::{ANONYMOUS_TOKEN, ApiTransport, Login, Payload};
pub use write::{LABEL_DESCRIPTION_CONFLICT, WriteOutcome};
