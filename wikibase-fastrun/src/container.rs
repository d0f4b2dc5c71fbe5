use crate::baseline::{BaselineSource, BaselineStatement, LanguageSnapshot};
use crate::error::FastRunResult;
use crate::key::{BaseFilter, FastRunKey};
use crate::resolver::{StandardValueResolver, ValueResolver};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock as StdRwLock};
use tokio::sync::RwLock;
use tracing::debug;
use wikibase_model::{Claim, Claims, Entity, Reference, Snak};

/// Caller-specific state a shared container is rebound to on every acquisition.
#[derive(Debug, Clone)]
pub struct FastRunContext {
    /// Subject the most recent comparison was scoped to. Reset on every
    /// acquisition; never read back as a comparison scope.
    pub current_subject_id: Option<String>,
    pub mediawiki_api_url: String,
    pub wikibase_url: String,
    pub resolver: Arc<dyn ValueResolver>,
}

impl FastRunContext {
    pub fn new(mediawiki_api_url: impl Into<String>, wikibase_url: impl Into<String>) -> Self {
        Self {
            current_subject_id: None,
            mediawiki_api_url: mediawiki_api_url.into(),
            wikibase_url: wikibase_url.into(),
            resolver: Arc::new(StandardValueResolver),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ValueResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

/// Remote state loaded so far, per property and per (subject, language).
#[derive(Debug, Default)]
struct Baseline {
    loaded_properties: HashSet<String>,
    /// subject → property → statements
    statements: HashMap<String, HashMap<String, Vec<BaselineStatement>>>,
    languages: HashMap<(String, String), LanguageSnapshot>,
}

impl Baseline {
    fn statements_for<'a>(
        &'a self,
        subject: &str,
        property: &str,
    ) -> impl Iterator<Item = &'a BaselineStatement> + 'a {
        self.statements
            .get(subject)
            .and_then(|by_property| by_property.get(property))
            .into_iter()
            .flatten()
    }
}

/// Result of comparing one entity against the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCheck {
    pub write_required: bool,
    /// Subject the comparison was scoped to, if one was given or resolved.
    pub subject: Option<String>,
}

/// Comparable form of one statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct StatementSignature {
    value: String,
    qualifiers: Vec<(String, String)>,
    references: Vec<Vec<(String, String)>>,
}

/// A cached remote baseline for one filter scope.
///
/// Obtained from [`crate::FastRunRegistry::acquire`]; never constructed directly.
pub struct FastRunContainer {
    key: FastRunKey,
    source: Arc<dyn BaselineSource>,
    context: StdRwLock<FastRunContext>,
    baseline: RwLock<Baseline>,
    check_language_data: AtomicBool,
}

impl FastRunContainer {
    pub(crate) fn new(
        key: FastRunKey,
        context: FastRunContext,
        source: Arc<dyn BaselineSource>,
    ) -> Self {
        Self {
            key,
            source,
            context: StdRwLock::new(context),
            baseline: RwLock::new(Baseline::default()),
            check_language_data: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &FastRunKey {
        &self.key
    }

    pub fn base_filter(&self) -> &BaseFilter {
        &self.key.base_filter
    }

    pub fn use_refs(&self) -> bool {
        self.key.use_refs
    }

    pub fn case_insensitive(&self) -> bool {
        self.key.case_insensitive
    }

    pub fn sparql_endpoint_url(&self) -> &str {
        &self.key.sparql_endpoint_url
    }

    /// Snapshot of the current caller context.
    pub fn context(&self) -> FastRunContext {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn rebind(&self, context: FastRunContext) {
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// Subject the most recent comparison was scoped to.
    pub fn current_subject_id(&self) -> Option<String> {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current_subject_id
            .clone()
    }

    pub(crate) fn set_current_subject_id(&self, subject: Option<String>) {
        self.context
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .current_subject_id = subject;
    }

    pub fn check_language_data(&self) -> bool {
        self.check_language_data.load(Ordering::SeqCst)
    }

    /// Enables or disables comparing labels, descriptions and aliases.
    pub fn set_check_language_data(&self, enabled: bool) {
        self.check_language_data.store(enabled, Ordering::SeqCst);
    }

    /// Number of properties whose baseline has been loaded.
    pub async fn loaded_property_count(&self) -> usize {
        self.baseline.read().await.loaded_properties.len()
    }

    async fn load_properties(&self, properties: &[&str]) -> FastRunResult<()> {
        {
            let baseline = self.baseline.read().await;
            if properties
                .iter()
                .all(|p| baseline.loaded_properties.contains(*p))
            {
                return Ok(());
            }
        }

        let mut baseline = self.baseline.write().await;
        for property in properties {
            if baseline.loaded_properties.contains(*property) {
                continue;
            }
            debug!(property, endpoint = %self.key.sparql_endpoint_url, "loading fast run baseline");
            let statements = self
                .source
                .fetch_property(&self.key.sparql_endpoint_url, &self.key.base_filter, property)
                .await?;
            for statement in statements {
                baseline
                    .statements
                    .entry(statement.subject.clone())
                    .or_default()
                    .entry(statement.mainsnak.property.clone())
                    .or_default()
                    .push(statement);
            }
            baseline.loaded_properties.insert(property.to_string());
        }
        Ok(())
    }

    /// Whether writing `claims` would change the server's state for `subject`.
    ///
    /// Without a subject, one is resolved for this call as the single baseline
    /// subject holding every claim's value. A write is required when a claim is
    /// flagged for removal, when no unique subject exists, or when any touched
    /// property's statements differ as sets.
    pub async fn write_required(
        &self,
        claims: &Claims,
        subject: Option<&str>,
    ) -> FastRunResult<bool> {
        Ok(self.compare_claims(claims, subject).await?.write_required)
    }

    /// Whether the entity's labels, descriptions or aliases differ from the
    /// server's for `subject`.
    ///
    /// Always `false` unless language checking is enabled. With language data
    /// present but no subject, a write is required.
    pub async fn language_data_required(
        &self,
        entity: &Entity,
        subject: Option<&str>,
    ) -> FastRunResult<bool> {
        if !self.check_language_data() {
            return Ok(false);
        }

        let mut languages: BTreeSet<&str> = BTreeSet::new();
        languages.extend(entity.labels.iter().flat_map(|l| l.languages()));
        languages.extend(entity.descriptions.iter().flat_map(|d| d.languages()));
        languages.extend(entity.aliases.iter().flat_map(|a| a.languages()));
        if languages.is_empty() {
            return Ok(false);
        }

        let Some(subject) = subject else {
            return Ok(true);
        };

        for language in languages {
            let remote = self.language_snapshot(subject, language).await?;

            let label = entity.labels.as_ref().and_then(|l| l.get(language));
            if label.is_some_and(|label| !self.same_text(Some(label), remote.label.as_deref())) {
                debug!(%subject, language, "label differs; write required");
                return Ok(true);
            }

            let description = entity.descriptions.as_ref().and_then(|d| d.get(language));
            if description.is_some_and(|description| {
                !self.same_text(Some(description), remote.description.as_deref())
            }) {
                debug!(%subject, language, "description differs; write required");
                return Ok(true);
            }

            let aliases = entity
                .aliases
                .as_ref()
                .map(|a| a.get(language))
                .unwrap_or_default();
            if !aliases.is_empty() {
                let local: BTreeSet<String> = aliases.iter().map(|a| self.fold(a)).collect();
                let remote: BTreeSet<String> =
                    remote.aliases.iter().map(|a| self.fold(a)).collect();
                if local != remote {
                    debug!(%subject, language, "aliases differ; write required");
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Compares claims and language data of `entity`, scoped to its own id
    /// when it has one.
    pub async fn check(&self, entity: &Entity) -> FastRunResult<WriteCheck> {
        let id = entity.id.as_deref().filter(|id| !id.is_empty());
        let check = self.compare_claims(&entity.claims, id).await?;
        if check.write_required {
            return Ok(check);
        }
        let write_required = self
            .language_data_required(entity, check.subject.as_deref())
            .await?;
        Ok(WriteCheck {
            write_required,
            subject: check.subject,
        })
    }

    /// Claims or language data require a write.
    pub async fn requires_write(&self, entity: &Entity) -> FastRunResult<bool> {
        Ok(self.check(entity).await?.write_required)
    }

    async fn compare_claims(
        &self,
        claims: &Claims,
        subject: Option<&str>,
    ) -> FastRunResult<WriteCheck> {
        if claims.iter().any(Claim::is_removed) {
            debug!("claims include removals; write required");
            return Ok(WriteCheck {
                write_required: true,
                subject: subject.map(str::to_string),
            });
        }

        let properties: Vec<&str> = claims.properties().collect();
        self.load_properties(&properties).await?;

        let context = self.context();
        let baseline = self.baseline.read().await;

        let subject = match subject {
            Some(subject) => subject.to_string(),
            None => match self.resolve_subject(&baseline, claims, &context) {
                Some(subject) => subject,
                None => {
                    self.set_current_subject_id(None);
                    return Ok(WriteCheck {
                        write_required: true,
                        subject: None,
                    });
                }
            },
        };
        self.set_current_subject_id(Some(subject.clone()));

        for property in properties {
            let local: BTreeSet<StatementSignature> = claims
                .get(property)
                .iter()
                .map(|claim| {
                    let references: Vec<&Reference> = claim.iter_references().collect();
                    self.signature(&claim.mainsnak, claim.iter_qualifiers(), &references, &context)
                })
                .collect();
            let remote: BTreeSet<StatementSignature> = baseline
                .statements_for(&subject, property)
                .map(|statement| {
                    let references: Vec<&Reference> = statement.references.iter().collect();
                    self.signature(
                        &statement.mainsnak,
                        statement.qualifiers.iter(),
                        &references,
                        &context,
                    )
                })
                .collect();

            if local != remote {
                debug!(%subject, property, "claims differ from baseline; write required");
                return Ok(WriteCheck {
                    write_required: true,
                    subject: Some(subject),
                });
            }
        }

        debug!(%subject, "claims match baseline");
        Ok(WriteCheck {
            write_required: false,
            subject: Some(subject),
        })
    }

    async fn language_snapshot(&self, subject: &str, language: &str) -> FastRunResult<LanguageSnapshot> {
        let cache_key = (subject.to_string(), language.to_string());
        if let Some(snapshot) = self.baseline.read().await.languages.get(&cache_key) {
            return Ok(snapshot.clone());
        }

        let snapshot = self
            .source
            .fetch_language_data(&self.key.sparql_endpoint_url, subject, language)
            .await?;
        self.baseline
            .write()
            .await
            .languages
            .insert(cache_key, snapshot.clone());
        Ok(snapshot)
    }

    fn resolve_subject(
        &self,
        baseline: &Baseline,
        claims: &Claims,
        context: &FastRunContext,
    ) -> Option<String> {
        let mut candidates: Option<HashSet<&str>> = None;

        for claim in claims.iter() {
            let wanted = self.comparable(&claim.mainsnak, context);
            let holders: HashSet<&str> = baseline
                .statements
                .iter()
                .filter(|(_, by_property)| {
                    by_property.get(claim.property()).is_some_and(|statements| {
                        statements
                            .iter()
                            .any(|s| self.comparable(&s.mainsnak, context) == wanted)
                    })
                })
                .map(|(subject, _)| subject.as_str())
                .collect();

            let narrowed = match candidates {
                None => holders,
                Some(previous) => previous.intersection(&holders).copied().collect(),
            };
            if narrowed.is_empty() {
                debug!(property = claim.property(), "no baseline subject holds this value");
                return None;
            }
            candidates = Some(narrowed);
        }

        match candidates {
            Some(subjects) if subjects.len() == 1 => subjects.into_iter().next().map(str::to_string),
            Some(subjects) => {
                debug!(matches = subjects.len(), "ambiguous fast run subject");
                None
            }
            None => None,
        }
    }

    fn signature<'a>(
        &self,
        mainsnak: &Snak,
        qualifiers: impl Iterator<Item = &'a Snak>,
        references: &[&Reference],
        context: &FastRunContext,
    ) -> StatementSignature {
        let mut qualifiers: Vec<(String, String)> = qualifiers
            .map(|q| (q.property.clone(), self.comparable(q, context)))
            .collect();
        qualifiers.sort();

        let mut references: Vec<Vec<(String, String)>> = if self.key.use_refs {
            references
                .iter()
                .map(|reference| {
                    let mut snaks: Vec<(String, String)> = reference
                        .iter_snaks()
                        .map(|s| (s.property.clone(), self.comparable(s, context)))
                        .collect();
                    snaks.sort();
                    snaks
                })
                .collect()
        } else {
            Vec::new()
        };
        references.sort();

        StatementSignature {
            value: self.comparable(mainsnak, context),
            qualifiers,
            references,
        }
    }

    fn comparable(&self, snak: &Snak, context: &FastRunContext) -> String {
        let rendered = context.resolver.comparable(snak, &context.wikibase_url);
        if self.key.case_insensitive && snak.is_textual() {
            rendered.to_lowercase()
        } else {
            rendered
        }
    }

    fn fold(&self, text: &str) -> String {
        if self.key.case_insensitive {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }

    fn same_text(&self, local: Option<&str>, remote: Option<&str>) -> bool {
        local.map(|t| self.fold(t)) == remote.map(|t| self.fold(t))
    }
}

impl std::fmt::Debug for FastRunContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastRunContainer")
            .field("key", &self.key)
            .field("context", &self.context())
            .field("check_language_data", &self.check_language_data())
            .finish_non_exhaustive()
    }
}
