use crate::baseline::BaselineSource;
use crate::container::{FastRunContainer, FastRunContext};
use crate::key::FastRunKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Process-wide pool of fast-run containers, one per [`FastRunKey`].
///
/// Build one at startup and share it (behind an `Arc`) with every client that
/// should reuse baselines.
#[derive(Default)]
pub struct FastRunRegistry {
    containers: Mutex<HashMap<FastRunKey, Arc<FastRunContainer>>>,
}

impl FastRunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the container for `key`, creating and registering it on first use.
    ///
    /// An existing container is rebound to `context` and keeps its own baseline
    /// source; `source` is only used when a new container is created. Lookup and
    /// insert happen under one lock, so concurrent callers never register two
    /// containers for the same key.
    pub fn acquire(
        &self,
        key: FastRunKey,
        context: FastRunContext,
        source: Arc<dyn BaselineSource>,
    ) -> Arc<FastRunContainer> {
        let mut containers = self
            .containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = containers.get(&key) {
            debug!(endpoint = %key.sparql_endpoint_url, "found an already existing fast run container");
            existing.rebind(context);
            return Arc::clone(existing);
        }

        info!(
            endpoint = %key.sparql_endpoint_url,
            use_refs = key.use_refs,
            case_insensitive = key.case_insensitive,
            "creating a new fast run container"
        );
        let container = Arc::new(FastRunContainer::new(key.clone(), context, source));
        containers.insert(key, Arc::clone(&container));
        container
    }

    /// Looks up a container without creating or rebinding it.
    pub fn get(&self, key: &FastRunKey) -> Option<Arc<FastRunContainer>> {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FastRunRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastRunRegistry")
            .field("containers", &self.len())
            .finish()
    }
}
