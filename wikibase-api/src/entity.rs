use crate::client::WikibaseClient;
use crate::error::{WbiError, WbiResult};
use crate::write::{self, EditTarget, WriteOutcome, WriteStage};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};
use wikibase_fastrun::{BaseFilter, FastRunContainer, FastRunKey};
use wikibase_model::{ActionIfExists, ClaimBatch, Entity, EntityType};

/// An [`Entity`] bound to the client it is read from and written through.
///
/// One handle has one logical owner; mutate it from a single task.
pub struct WikibaseEntity {
    client: Arc<WikibaseClient>,
    entity: Entity,
    require_write: bool,
    fast_run_container: Option<Arc<FastRunContainer>>,
}

impl WikibaseEntity {
    /// Creates an unsaved entity of `entity_type`.
    pub fn new(client: Arc<WikibaseClient>, entity_type: EntityType) -> Self {
        Self::from_entity(client, Entity::new(entity_type))
    }

    pub fn from_entity(client: Arc<WikibaseClient>, entity: Entity) -> Self {
        let require_write = !client.is_search_only();
        Self {
            client,
            entity,
            require_write,
            fast_run_container: None,
        }
    }

    /// Fetches `entity_id` and hydrates a handle from the response.
    ///
    /// Fails with [`WbiError::NotFound`] when the server reports the entity missing.
    pub async fn load(client: Arc<WikibaseClient>, entity_id: &str) -> WbiResult<Self> {
        let body = write::check_api_error(client.get_entities(entity_id).await?)?;
        let data = body
            .get("entities")
            .and_then(|entities| entities.get(entity_id))
            .ok_or_else(|| {
                WbiError::MalformedData(format!("response has no entities.{entity_id}"))
            })?;
        let entity = Entity::from_wire(data)?;
        debug!(id = entity_id, lastrevid = entity.lastrevid, "loaded entity");
        Ok(Self::from_entity(client, entity))
    }

    /// Raw `wbgetentities` body for `entity_id`, requested anonymously.
    pub async fn get(&self, entity_id: &str) -> WbiResult<Value> {
        self.client.get_entities(entity_id).await
    }

    pub fn client(&self) -> &Arc<WikibaseClient> {
        &self.client
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn id(&self) -> Option<&str> {
        self.entity.id.as_deref()
    }

    pub fn lastrevid(&self) -> Option<u64> {
        self.entity.lastrevid
    }

    /// Outcome of the last fast-run check; `true` until one has run.
    pub fn require_write(&self) -> bool {
        self.require_write
    }

    pub fn fast_run_container(&self) -> Option<&Arc<FastRunContainer>> {
        self.fast_run_container.as_ref()
    }

    pub fn add_claims(
        &mut self,
        claims: impl Into<ClaimBatch>,
        if_exists: ActionIfExists,
    ) -> WbiResult<&mut Self> {
        self.entity.add_claims(claims, if_exists)?;
        Ok(self)
    }

    pub fn to_wire(&self) -> Value {
        self.entity.to_wire()
    }

    /// Replaces the entity with `data`. On failure the handle is unchanged.
    pub fn from_wire(&mut self, data: &Value) -> WbiResult<&mut Self> {
        self.entity = Entity::from_wire(data)?;
        Ok(self)
    }

    /// Attaches the shared fast-run container for this filter scope.
    ///
    /// Requires a baseline source on the client.
    pub fn init_fastrun(
        &mut self,
        base_filter: BaseFilter,
        use_refs: bool,
        case_insensitive: bool,
    ) -> WbiResult<Arc<FastRunContainer>> {
        let source = self.client.baseline_source().ok_or_else(|| {
            WbiError::InvalidArgument("fast run requires a baseline source on the client".into())
        })?;
        let key = FastRunKey::new(base_filter, self.client.config().sparql_endpoint_url.as_str())
            .use_refs(use_refs)
            .case_insensitive(case_insensitive);

        let container = self.client.fastrun_registry().acquire(
            key,
            self.client.fastrun_context(),
            Arc::clone(source),
        );
        self.fast_run_container = Some(Arc::clone(&container));
        Ok(container)
    }

    /// Asks the attached container whether the entity differs from the baseline.
    ///
    /// A saved entity is compared against its own id; an unsaved one against
    /// the subject resolved for this call. Without a container a write is
    /// always required.
    pub async fn fastrun_require_write(&self) -> WbiResult<bool> {
        match &self.fast_run_container {
            Some(container) => Ok(container.requires_write(&self.entity).await?),
            None => Ok(true),
        }
    }

    /// Writes the entity, unless an attached fast-run container shows the
    /// server already holds it.
    pub async fn write(&mut self, summary: &str, allow_anonymous: bool) -> WbiResult<WriteOutcome> {
        if self.client.is_search_only() {
            return Err(WbiError::SearchOnly);
        }

        if let Some(container) = &self.fast_run_container {
            let check = container.check(&self.entity).await?;
            self.require_write = check.write_required;
            if !self.require_write {
                if self.entity.id.is_none() {
                    self.entity.id = check.subject;
                }
                info!(id = self.id(), "entity matches fast run baseline; skipping write");
                return Ok(WriteOutcome::Skipped {
                    id: self.entity.id.clone(),
                });
            }
        }

        let data = self.entity.to_wire();
        let entity = self.write_data(&data, summary, allow_anonymous).await?;
        Ok(WriteOutcome::Applied { entity })
    }

    /// Submits `data` through `wbeditentity` and returns the server's `entity` object.
    ///
    /// The entity is created when it has no id and edited otherwise. `id` and
    /// `lastrevid` are updated only after the response is classified as a success.
    pub async fn write_data(
        &mut self,
        data: &Value,
        summary: &str,
        allow_anonymous: bool,
    ) -> WbiResult<Value> {
        debug!(stage = %WriteStage::CheckingMode, "write");
        let config = self.client.config();
        if config.search_only {
            return Err(WbiError::SearchOnly);
        }
        if data.is_null() || data.as_object().is_some_and(|fields| fields.is_empty()) {
            return Err(WbiError::InvalidArgument("no data to write".into()));
        }

        debug!(stage = %WriteStage::Serializing, "write");
        let target = match self.entity.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => EditTarget::Existing(id),
            None => EditTarget::New(&self.entity.entity_type),
        };
        let payload = write::build_payload(config, data, summary, target)?;
        if config.debug {
            info!(?payload, "wbeditentity payload");
        }

        let result = async {
            debug!(stage = %WriteStage::Submitting, "write");
            let response = self.client.call(&payload, allow_anonymous).await?;
            debug!(stage = %WriteStage::Classifying, "write");
            write::classify_response(response)
        }
        .await;

        match result {
            Ok(applied) => {
                info!(id = %applied.id, lastrevid = applied.lastrevid, "entity written");
                self.entity.id = Some(applied.id);
                if let Some(lastrevid) = applied.lastrevid {
                    self.entity.lastrevid = Some(lastrevid);
                }
                Ok(applied.entity)
            }
            Err(err) => {
                error!(error = %err, "error while writing to the Wikibase instance");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for WikibaseEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikibaseEntity")
            .field("entity", &self.entity)
            .field("require_write", &self.require_write)
            .field("fast_run_container", &self.fast_run_container)
            .finish_non_exhaustive()
    }
}
