#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use wikibase_api::transport::mock::{MockTransport, RecordedCall};
use wikibase_api::{ApiTransport, WbiConfig, WikibaseClient};

pub fn mock_client(config: WbiConfig) -> (Arc<WikibaseClient>, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let dyn_transport: Arc<dyn ApiTransport> = transport.clone();
    (Arc::new(WikibaseClient::new(config, dyn_transport)), transport)
}

pub fn success(id: &str, lastrevid: u64) -> Value {
    json!({
        "success": 1,
        "entity": { "id": id, "lastrevid": lastrevid, "type": "item", "claims": {} }
    })
}

pub fn conflict() -> Value {
    json!({
        "error": {
            "code": "modification-failed",
            "info": "Item [[Q42|Q42]] already has label \"Douglas Adams\" associated with language code en, using the same description text.",
            "messages": [{
                "name": "wikibase-validator-label-with-description-conflict",
                "parameters": ["Douglas Adams", "en", "[[Item:Q42|Q42]]"],
                "html": { "*": "..." }
            }]
        }
    })
}

pub fn field<'a>(call: &'a RecordedCall, key: &str) -> Option<&'a str> {
    call.payload.get(key).map(String::as_str)
}

/// Decodes the JSON-encoded `data` field of a write request.
pub fn sent_data(call: &RecordedCall) -> Value {
    let data = field(call, "data").expect("write request has data");
    serde_json::from_str(data).expect("data is JSON")
}
