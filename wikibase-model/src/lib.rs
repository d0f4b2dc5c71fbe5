//! Entity and claim model for Wikibase repositories.
//!
//! Defines the data types every other layer of the client works with:
//! - [`DataValue`]: the typed value carried by a snak (string, entity reference, quantity, ...)
//! - [`Snak`] and [`Claim`]: a single property-value statement with qualifiers and references
//! - [`Claims`]: the per-property claim store with [`ActionIfExists`] merge policies
//! - [`Entity`]: identity, revision, kind, language data and claims, plus its wire form
//!
//! Nothing here performs I/O. The write protocol and the fast-run cache live in
//! `wikibase-api` and `wikibase-fastrun`.
//!
//! # Example
//!
//! ```
//! use wikibase_model::{ActionIfExists, Claim, Entity, EntityType};
//!
//! let mut entity = Entity::new(EntityType::Item);
//! entity
//!     .add_claims(Claim::string("P1476", "Hello"), ActionIfExists::Append)
//!     .unwrap();
//!
//! let wire = entity.to_wire();
//! assert_eq!(wire["type"], "item");
//! assert!(wire.get("id").is_none());
//! ```

mod claim;
mod claims;
mod datavalue;
mod entity;
mod error;
mod language;
mod snak;

pub use claim::{Claim, Rank, Reference};
pub use claims::{ActionIfExists, ClaimBatch, Claims};
pub use datavalue::{
    DataValue, EntityIdValue, GlobeCoordinateValue, MonolingualTextValue, QuantityValue,
    TimeValue,
};
pub use entity::{Entity, EntityType};
pub use error::{ModelError, ModelResult};
pub use language::{Aliases, LanguageValue, LanguageValues};
pub use snak::{Snak, SnakType};
