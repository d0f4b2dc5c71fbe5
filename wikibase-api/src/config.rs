//! Client configuration.

use serde::{Deserialize, Serialize};

/// Settings shared by every request a [`crate::WikibaseClient`] makes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WbiConfig {
    /// MediaWiki action API endpoint (`…/w/api.php`).
    pub mediawiki_api_url: String,
    /// SPARQL endpoint the fast-run baseline is queried from.
    pub sparql_endpoint_url: String,
    /// Concept URI prefix of the instance (`http://www.wikidata.org`).
    pub wikibase_url: String,
    /// Replication lag threshold in seconds sent as `maxlag`. `0` omits it.
    pub maxlag: u64,
    /// Flag edits as bot edits.
    pub is_bot: bool,
    /// Log outgoing write payloads at info level.
    pub debug: bool,
    /// Read-only client; every write fails before reaching the network.
    pub search_only: bool,
    pub user_agent: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WbiConfig {
    fn default() -> Self {
        Self {
            mediawiki_api_url: "https://www.wikidata.org/w/api.php".to_string(),
            sparql_endpoint_url: "https://query.wikidata.org/sparql".to_string(),
            wikibase_url: "http://www.wikidata.org".to_string(),
            maxlag: 5,
            is_bot: false,
            debug: false,
            search_only: false,
            user_agent: format!("wikibase-api/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 60,
        }
    }
}
