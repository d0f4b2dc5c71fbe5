//! Query seam the fast-run container loads its baseline from.
//!
//! Production sources run SPARQL against the endpoint named in the
//! container's key; the in-memory source in [`memory`] serves tests.

use crate::error::FastRunResult;
use crate::key::BaseFilter;
use async_trait::async_trait;
use wikibase_model::{Reference, Snak};

/// One statement the server holds for a subject inside the filter scope.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineStatement {
    pub subject: String,
    pub statement_id: Option<String>,
    pub mainsnak: Snak,
    pub qualifiers: Vec<Snak>,
    pub references: Vec<Reference>,
}

impl BaselineStatement {
    pub fn new(subject: impl Into<String>, mainsnak: Snak) -> Self {
        Self {
            subject: subject.into(),
            statement_id: None,
            mainsnak,
            qualifiers: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn with_statement_id(mut self, id: impl Into<String>) -> Self {
        self.statement_id = Some(id.into());
        self
    }

    pub fn with_qualifier(mut self, snak: Snak) -> Self {
        self.qualifiers.push(snak);
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }
}

/// Label, description and aliases of one subject in one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSnapshot {
    pub label: Option<String>,
    pub description: Option<String>,
    pub aliases: Vec<String>,
}

/// Supplies the remote state a container compares against.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    /// All statements on `property` for every subject matched by `base_filter`.
    async fn fetch_property(
        &self,
        sparql_endpoint_url: &str,
        base_filter: &BaseFilter,
        property: &str,
    ) -> FastRunResult<Vec<BaselineStatement>>;

    /// Terms of `subject` in `language`.
    async fn fetch_language_data(
        &self,
        sparql_endpoint_url: &str,
        subject: &str,
        language: &str,
    ) -> FastRunResult<LanguageSnapshot>;
}

/// An in-memory baseline source for testing.
pub mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};
    use wikibase_model::DataValue;

    /// Serves a fixed set of statements and counts how often it is queried.
    #[derive(Debug, Default)]
    pub struct InMemoryBaseline {
        statements: Mutex<Vec<BaselineStatement>>,
        languages: Mutex<HashMap<(String, String), LanguageSnapshot>>,
        property_fetches: AtomicUsize,
        language_fetches: AtomicUsize,
    }

    impl InMemoryBaseline {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, statement: BaselineStatement) {
            self.statements
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(statement);
        }

        pub fn insert_language(
            &self,
            subject: impl Into<String>,
            language: impl Into<String>,
            snapshot: LanguageSnapshot,
        ) {
            self.languages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((subject.into(), language.into()), snapshot);
        }

        /// Number of `fetch_property` calls served.
        pub fn property_fetches(&self) -> usize {
            self.property_fetches.load(Ordering::SeqCst)
        }

        /// Number of `fetch_language_data` calls served.
        pub fn language_fetches(&self) -> usize {
            self.language_fetches.load(Ordering::SeqCst)
        }

        fn in_scope(statements: &[BaselineStatement], filter: &BaseFilter) -> HashSet<String> {
            let subjects: HashSet<String> =
                statements.iter().map(|s| s.subject.clone()).collect();
            subjects
                .into_iter()
                .filter(|subject| {
                    filter.iter().all(|(property, required)| {
                        statements.iter().any(|s| {
                            &s.subject == subject
                                && s.mainsnak.property == property
                                && required.is_none_or(|value| holds(&s.mainsnak, value))
                        })
                    })
                })
                .collect()
        }
    }

    fn holds(snak: &Snak, value: &str) -> bool {
        match &snak.datavalue {
            Some(DataValue::EntityId(v)) => v.resolved_id().as_deref() == Some(value),
            Some(DataValue::String(s)) => s == value,
            _ => false,
        }
    }

    #[async_trait]
    impl BaselineSource for InMemoryBaseline {
        async fn fetch_property(
            &self,
            _sparql_endpoint_url: &str,
            base_filter: &BaseFilter,
            property: &str,
        ) -> FastRunResult<Vec<BaselineStatement>> {
            self.property_fetches.fetch_add(1, Ordering::SeqCst);
            let statements = self
                .statements
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let scope = Self::in_scope(&statements, base_filter);
            Ok(statements
                .iter()
                .filter(|s| s.mainsnak.property == property && scope.contains(&s.subject))
                .cloned()
                .collect())
        }

        async fn fetch_language_data(
            &self,
            _sparql_endpoint_url: &str,
            subject: &str,
            language: &str,
        ) -> FastRunResult<LanguageSnapshot> {
            self.language_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .languages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&(subject.to_string(), language.to_string()))
                .cloned()
                .unwrap_or_default())
        }
    }
}
