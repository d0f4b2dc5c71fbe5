use std::sync::Arc;
use std::thread;
use wikibase_fastrun::baseline::memory::InMemoryBaseline;
use wikibase_fastrun::{BaseFilter, FastRunContext, FastRunKey, FastRunRegistry};

const SPARQL: &str = "https://query.wikidata.org/sparql";
const API: &str = "https://www.wikidata.org/w/api.php";
const WIKIBASE: &str = "http://www.wikidata.org";

fn humans() -> BaseFilter {
    BaseFilter::new().with("P31", "Q5")
}

fn context() -> FastRunContext {
    FastRunContext::new(API, WIKIBASE)
}

fn source() -> Arc<InMemoryBaseline> {
    Arc::new(InMemoryBaseline::new())
}

// ── Reuse ────────────────────────────────────────────────────────

#[test]
fn identical_keys_share_one_container() {
    let registry = FastRunRegistry::new();
    let key = FastRunKey::new(humans(), SPARQL);

    let a = registry.acquire(key.clone(), context(), source());
    let b = registry.acquire(key, context(), source());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
}

#[test]
fn any_differing_field_creates_a_new_container() {
    let registry = FastRunRegistry::new();
    let base = FastRunKey::new(humans(), SPARQL);
    let first = registry.acquire(base.clone(), context(), source());

    let variants = [
        FastRunKey::new(BaseFilter::new().with("P31", "Q6256"), SPARQL),
        base.clone().use_refs(true),
        base.clone().case_insensitive(true),
        FastRunKey::new(humans(), "https://example.org/sparql"),
    ];
    for variant in variants {
        let other = registry.acquire(variant, context(), source());
        assert!(!Arc::ptr_eq(&first, &other));
    }
    assert_eq!(registry.len(), 5);
}

#[test]
fn filter_identity_is_case_sensitive() {
    let registry = FastRunRegistry::new();
    let upper = registry.acquire(
        FastRunKey::new(BaseFilter::new().with("P31", "Q5"), SPARQL).case_insensitive(true),
        context(),
        source(),
    );
    let lower = registry.acquire(
        FastRunKey::new(BaseFilter::new().with("P31", "q5"), SPARQL).case_insensitive(true),
        context(),
        source(),
    );
    assert!(!Arc::ptr_eq(&upper, &lower));
}

// ── Context rebinding ────────────────────────────────────────────

#[test]
fn reuse_rebinds_transient_context() {
    let registry = FastRunRegistry::new();
    let key = FastRunKey::new(humans(), SPARQL);

    let mut bound = context();
    bound.current_subject_id = Some("Q42".into());
    let container = registry.acquire(key.clone(), bound, source());
    assert_eq!(container.current_subject_id().as_deref(), Some("Q42"));

    let rebound = registry.acquire(
        key,
        FastRunContext::new("https://test.wikidata.org/w/api.php", "https://test.wikidata.org"),
        source(),
    );

    let ctx = rebound.context();
    assert_eq!(ctx.current_subject_id, None);
    assert_eq!(ctx.mediawiki_api_url, "https://test.wikidata.org/w/api.php");
    assert_eq!(ctx.wikibase_url, "https://test.wikidata.org");
    assert_eq!(container.current_subject_id(), None);
}

#[test]
fn get_does_not_create() {
    let registry = FastRunRegistry::new();
    assert!(registry.get(&FastRunKey::new(humans(), SPARQL)).is_none());
    assert!(registry.is_empty());
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_acquisitions_never_duplicate() {
    let registry = Arc::new(FastRunRegistry::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let filter = BaseFilter::new().with("P31", format!("Q{}", i % 4));
                registry.acquire(FastRunKey::new(filter, SPARQL), context(), source())
            })
        })
        .collect();
    let containers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(registry.len(), 4);
    for (i, a) in containers.iter().enumerate() {
        for (j, b) in containers.iter().enumerate() {
            assert_eq!(Arc::ptr_eq(a, b), i % 4 == j % 4);
        }
    }
}
