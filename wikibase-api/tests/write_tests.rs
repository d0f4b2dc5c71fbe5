mod common;

use common::{conflict, field, mock_client, sent_data, success};
use pretty_assertions::assert_eq;
use serde_json::json;
use wikibase_api::{Login, TransportError, WbiConfig, WbiError, WikibaseEntity, WriteOutcome};
use wikibase_model::{ActionIfExists, Claim, Entity, EntityType};

fn titled_item(client: std::sync::Arc<wikibase_api::WikibaseClient>) -> WikibaseEntity {
    let mut entity = WikibaseEntity::new(client, EntityType::Item);
    entity
        .add_claims(Claim::string("P1476", "Hello"), ActionIfExists::Append)
        .unwrap();
    entity
}

// ── Create vs edit ──────────────────────────────────────────────

#[tokio::test]
async fn new_entity_is_created_and_adopts_server_id() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("Q123", 456));
    let mut entity = titled_item(client);

    let outcome = entity.write("create", false).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(field(&call, "action"), Some("wbeditentity"));
    assert_eq!(field(&call, "new"), Some("item"));
    assert_eq!(field(&call, "id"), None);
    assert_eq!(field(&call, "format"), Some("json"));
    assert_eq!(field(&call, "summary"), Some("create"));

    let data = sent_data(&call);
    assert_eq!(data["type"], "item");
    assert!(data.get("id").is_none());
    assert_eq!(data["claims"]["P1476"][0]["mainsnak"]["datavalue"]["value"], "Hello");

    assert_eq!(entity.id(), Some("Q123"));
    assert_eq!(entity.lastrevid(), Some(456));
    assert!(outcome.is_applied());
}

#[tokio::test]
async fn saved_entity_is_edited_by_id() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("Q42", 1000));
    let mut entity = WikibaseEntity::from_entity(client, Entity::new(EntityType::Item).with_id("Q42"));
    entity
        .add_claims(Claim::string("P1476", "Hello"), ActionIfExists::Append)
        .unwrap();

    entity.write("edit", false).await.unwrap();

    let call = transport.last_call().unwrap();
    assert_eq!(field(&call, "id"), Some("Q42"));
    assert_eq!(field(&call, "new"), None);
    assert_eq!(sent_data(&call)["id"], "Q42");
    assert_eq!(entity.lastrevid(), Some(1000));
}

#[tokio::test]
async fn new_property_sends_its_type() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("P9000", 7));
    let mut entity = WikibaseEntity::new(client, EntityType::Property);

    entity
        .write_data(&json!({ "datatype": "string", "claims": {} }), "", false)
        .await
        .unwrap();

    assert_eq!(field(&transport.last_call().unwrap(), "new"), Some("property"));
    assert_eq!(entity.id(), Some("P9000"));
}

// ── Optional request fields ─────────────────────────────────────

#[tokio::test]
async fn maxlag_sent_only_when_positive() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("Q1", 1));
    titled_item(client).write("", false).await.unwrap();
    assert_eq!(field(&transport.last_call().unwrap(), "maxlag"), Some("5"));

    let config = WbiConfig {
        maxlag: 0,
        ..Default::default()
    };
    let (client, transport) = mock_client(config);
    transport.push_response(success("Q1", 1));
    titled_item(client).write("", false).await.unwrap();
    assert_eq!(field(&transport.last_call().unwrap(), "maxlag"), None);
}

#[tokio::test]
async fn bot_marker_follows_config() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("Q1", 1));
    titled_item(client).write("", false).await.unwrap();
    assert_eq!(field(&transport.last_call().unwrap(), "bot"), None);

    let config = WbiConfig {
        is_bot: true,
        ..Default::default()
    };
    let (client, transport) = mock_client(config);
    transport.push_response(success("Q1", 1));
    titled_item(client).write("", false).await.unwrap();
    assert_eq!(field(&transport.last_call().unwrap(), "bot"), Some(""));
}

#[tokio::test]
async fn login_and_anonymity_are_forwarded() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("Q1", 1));
    transport.push_response(success("Q2", 2));

    titled_item(client.clone()).write("", true).await.unwrap();
    let anonymous = transport.last_call().unwrap();
    assert!(anonymous.allow_anonymous);
    assert_eq!(anonymous.login, None);
    assert_eq!(anonymous.endpoint, "https://www.wikidata.org/w/api.php");

    let logged_in = std::sync::Arc::new(
        wikibase_api::WikibaseClient::new(WbiConfig::default(), transport.clone())
            .with_login(Login::new("Bot", "csrf123+\\")),
    );
    titled_item(logged_in).write("", false).await.unwrap();
    let call = transport.last_call().unwrap();
    assert!(!call.allow_anonymous);
    assert_eq!(call.login.map(|l| l.edit_token), Some("csrf123+\\".to_string()));
}

// ── Failures ────────────────────────────────────────────────────

#[tokio::test]
async fn conflict_leaves_entity_untouched() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(conflict());
    let mut entity = titled_item(client);
    let before = entity.entity().clone();

    let err = entity.write("", false).await.unwrap_err();

    let WbiError::NonUniqueLabelDescriptionPair(response) = &err else {
        panic!("expected conflict, got {err:?}");
    };
    assert_eq!(response.conflicting_entity_id(), Some("Q42"));
    assert_eq!(response.language(), Some("en"));
    assert_eq!(response.response(), &conflict());
    assert_eq!(entity.entity(), &before);
    assert_eq!(entity.id(), None);
}

#[tokio::test]
async fn other_api_errors_are_generic() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(json!({
        "error": { "code": "maxlag", "info": "Waiting for 10.64.48.23: 7 seconds lagged" }
    }));
    let mut entity = titled_item(client);

    let err = entity.write("", false).await.unwrap_err();

    let WbiError::GenericApi(response) = &err else {
        panic!("expected generic API error, got {err:?}");
    };
    assert_eq!(response.code(), Some("maxlag"));
    assert_eq!(entity.id(), None);
}

#[tokio::test]
async fn transport_failures_pass_through() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_error(TransportError::Status {
        status: 503,
        body: "unavailable".into(),
    });
    let mut entity = titled_item(client);

    let err = entity.write("", false).await.unwrap_err();
    assert!(matches!(
        err,
        WbiError::Transport(TransportError::Status { status: 503, .. })
    ));
    assert_eq!(entity.lastrevid(), None);
}

#[tokio::test]
async fn revision_kept_without_success_marker() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(json!({ "entity": { "id": "Q42", "lastrevid": 200 } }));
    let stored = Entity::from_wire(&json!({
        "type": "item", "id": "Q42", "lastrevid": 100, "claims": {}
    }))
    .unwrap();
    let mut entity = WikibaseEntity::from_entity(client, stored);
    entity
        .add_claims(Claim::string("P1476", "Hello"), ActionIfExists::Append)
        .unwrap();

    entity.write("", false).await.unwrap();

    assert_eq!(entity.id(), Some("Q42"));
    assert_eq!(entity.lastrevid(), Some(100));
}

// ── Local refusals ──────────────────────────────────────────────

#[tokio::test]
async fn search_only_never_reaches_transport() {
    let config = WbiConfig {
        search_only: true,
        ..Default::default()
    };
    let (client, transport) = mock_client(config);
    let mut entity = titled_item(client);
    assert!(!entity.require_write());

    assert!(matches!(entity.write("", false).await, Err(WbiError::SearchOnly)));
    assert!(matches!(
        entity.write_data(&json!({ "claims": {} }), "", false).await,
        Err(WbiError::SearchOnly)
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn empty_data_is_rejected_before_submitting() {
    let (client, transport) = mock_client(WbiConfig::default());
    let mut entity = WikibaseEntity::new(client, EntityType::Item);

    for data in [json!(null), json!({})] {
        assert!(matches!(
            entity.write_data(&data, "", false).await,
            Err(WbiError::InvalidArgument(_))
        ));
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn write_without_fast_run_always_applies() {
    let (client, transport) = mock_client(WbiConfig::default());
    transport.push_response(success("Q5", 1));
    let mut entity = titled_item(client);
    assert!(entity.require_write());

    let outcome = entity.write("", false).await.unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Applied {
            entity: success("Q5", 1)["entity"].clone()
        }
    );
    assert_eq!(transport.call_count(), 1);
}
