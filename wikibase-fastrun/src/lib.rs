//! Write-avoidance ("fast run") cache for Wikibase clients.
//!
//! A [`FastRunContainer`] holds a baseline of what the server already stores
//! for every subject matched by a [`BaseFilter`], and answers whether a set of
//! claims (and optionally labels, descriptions and aliases) would change
//! anything. Containers are expensive to populate, so a [`FastRunRegistry`]
//! hands out one shared instance per [`FastRunKey`].
//!
//! # Components
//!
//! - **Key**: the identity tuple (filter, `use_refs`, `case_insensitive`, SPARQL endpoint)
//! - **Registry**: find-or-create pool of containers behind a mutex
//! - **Container**: lazily loaded baseline plus the rebindable caller context
//! - **Baseline source**: the query seam the container loads from
//! - **Resolver**: turns snak values into comparable strings
//!
//! # Concurrency
//!
//! Every comparison is scoped to the subject the caller passes, or to one
//! resolved for that call alone; the context's current subject only records
//! the latest result. Acquiring a container rebinds its context (current
//! subject, API URLs, resolver). Two callers sharing one key against different endpoints race on
//! that context; keep one key per endpoint when running writes concurrently.

pub mod baseline;
mod container;
mod error;
mod key;
mod registry;
mod resolver;

pub use baseline::{BaselineSource, BaselineStatement, LanguageSnapshot};
pub use container::{FastRunContainer, FastRunContext, WriteCheck};
pub use error::{FastRunError, FastRunResult};
pub use key::{BaseFilter, FastRunKey};
pub use registry::FastRunRegistry;
pub use resolver::{StandardValueResolver, ValueResolver};
