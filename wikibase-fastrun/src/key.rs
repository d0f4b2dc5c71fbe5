use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scoping predicate for a baseline: property id → required value.
///
/// `None` means "any value for this property". `{P31: Some("Q5"), P214: None}`
/// covers humans that have a VIAF id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseFilter(BTreeMap<String, Option<String>>);

impl BaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `property` to hold `value`.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(property.into(), Some(value.into()));
        self
    }

    /// Requires `property` to hold any value.
    pub fn with_any(mut self, property: impl Into<String>) -> Self {
        self.0.insert(property.into(), None);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_deref()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identity of a shared container. Matching is exact on all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FastRunKey {
    pub base_filter: BaseFilter,
    pub use_refs: bool,
    pub case_insensitive: bool,
    pub sparql_endpoint_url: String,
}

impl FastRunKey {
    pub fn new(base_filter: BaseFilter, sparql_endpoint_url: impl Into<String>) -> Self {
        Self {
            base_filter,
            use_refs: false,
            case_insensitive: false,
            sparql_endpoint_url: sparql_endpoint_url.into(),
        }
    }

    pub fn use_refs(mut self, use_refs: bool) -> Self {
        self.use_refs = use_refs;
        self
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }
}
