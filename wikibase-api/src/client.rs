use crate::config::WbiConfig;
use crate::error::WbiResult;
use crate::http::HttpTransport;
use crate::transport::{ApiTransport, Login, Payload};
use serde_json::Value;
use std::sync::Arc;
use wikibase_fastrun::{BaselineSource, FastRunContext, FastRunRegistry, ValueResolver};

/// Connection to one Wikibase instance: configuration, transport, session and
/// the fast-run pool shared by every entity handle built from it.
///
/// The configuration is fixed once the client is built. Wrap the client in an
/// `Arc` to hand it to [`crate::WikibaseEntity`] handles.
pub struct WikibaseClient {
    config: WbiConfig,
    transport: Arc<dyn ApiTransport>,
    login: Option<Login>,
    fastrun: Arc<FastRunRegistry>,
    baseline: Option<Arc<dyn BaselineSource>>,
    resolver: Option<Arc<dyn ValueResolver>>,
}

impl WikibaseClient {
    /// Creates a client over `transport` with its own fast-run registry.
    pub fn new(config: WbiConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            config,
            transport,
            login: None,
            fastrun: Arc::new(FastRunRegistry::new()),
            baseline: None,
            resolver: None,
        }
    }

    /// Creates a client speaking HTTP to `config.mediawiki_api_url`.
    pub fn with_http(config: WbiConfig) -> WbiResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn with_login(mut self, login: Login) -> Self {
        self.login = Some(login);
        self
    }

    /// Shares `registry` with other clients so they reuse loaded baselines.
    pub fn with_fastrun_registry(mut self, registry: Arc<FastRunRegistry>) -> Self {
        self.fastrun = registry;
        self
    }

    /// Source fast-run containers load their baseline from.
    pub fn with_baseline_source(mut self, source: Arc<dyn BaselineSource>) -> Self {
        self.baseline = Some(source);
        self
    }

    /// Resolver fast-run containers compare values with.
    pub fn with_value_resolver(mut self, resolver: Arc<dyn ValueResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &WbiConfig {
        &self.config
    }

    pub fn login(&self) -> Option<&Login> {
        self.login.as_ref()
    }

    pub fn is_search_only(&self) -> bool {
        self.config.search_only
    }

    pub fn fastrun_registry(&self) -> &Arc<FastRunRegistry> {
        &self.fastrun
    }

    pub fn baseline_source(&self) -> Option<&Arc<dyn BaselineSource>> {
        self.baseline.as_ref()
    }

    /// Caller context a fast-run container is rebound to when acquired through this client.
    pub fn fastrun_context(&self) -> FastRunContext {
        let context = FastRunContext::new(
            self.config.mediawiki_api_url.as_str(),
            self.config.wikibase_url.as_str(),
        );
        match &self.resolver {
            Some(resolver) => context.with_resolver(Arc::clone(resolver)),
            None => context,
        }
    }

    /// Issues `action=wbgetentities` for `entity_id` and returns the raw body.
    pub async fn get_entities(&self, entity_id: &str) -> WbiResult<Value> {
        let payload: Payload = [
            ("action", "wbgetentities"),
            ("ids", entity_id),
            ("format", "json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        self.call(&payload, true).await
    }

    pub(crate) async fn call(&self, payload: &Payload, allow_anonymous: bool) -> WbiResult<Value> {
        let response = self
            .transport
            .call(
                payload,
                &self.config.mediawiki_api_url,
                self.login.as_ref(),
                allow_anonymous,
            )
            .await?;
        Ok(response)
    }
}

impl std::fmt::Debug for WikibaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikibaseClient")
            .field("config", &self.config)
            .field("login", &self.login)
            .field("fastrun", &self.fastrun)
            .field("has_baseline_source", &self.baseline.is_some())
            .finish_non_exhaustive()
    }
}
