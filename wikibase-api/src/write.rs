//! Request assembly and response classification for `wbeditentity`.

use crate::config::WbiConfig;
use crate::error::{ApiErrorResponse, WbiError, WbiResult};
use crate::transport::Payload;
use serde_json::Value;
use std::fmt;
use tracing::warn;
use wikibase_model::EntityType;

/// Message name the server reports when a label and description pair is taken.
pub const LABEL_DESCRIPTION_CONFLICT: &str = "wikibase-validator-label-with-description-conflict";

/// Progress of one write, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteStage {
    CheckingMode,
    Serializing,
    Submitting,
    Classifying,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteStage::CheckingMode => "checking_mode",
            WriteStage::Serializing => "serializing",
            WriteStage::Submitting => "submitting",
            WriteStage::Classifying => "classifying",
        })
    }
}

/// Whether a write edits a saved entity or creates one.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EditTarget<'a> {
    Existing(&'a str),
    New(&'a EntityType),
}

/// What the server reported for a successful edit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AppliedEdit {
    pub id: String,
    /// Present only when the body also carries `success`.
    pub lastrevid: Option<u64>,
    pub entity: Value,
}

/// Result of [`crate::WikibaseEntity::write`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The edit was submitted; `entity` is the server's `entity` object.
    Applied { entity: Value },
    /// The fast-run baseline already matches; nothing was sent.
    Skipped { id: Option<String> },
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied { .. })
    }
}

pub(crate) fn build_payload(
    config: &WbiConfig,
    data: &Value,
    summary: &str,
    target: EditTarget<'_>,
) -> WbiResult<Payload> {
    let mut payload = Payload::new();
    payload.insert("action".into(), "wbeditentity".into());
    payload.insert("data".into(), serde_json::to_string(data)?);
    payload.insert("format".into(), "json".into());
    payload.insert("summary".into(), summary.to_string());

    if config.maxlag > 0 {
        payload.insert("maxlag".into(), config.maxlag.to_string());
    }
    if config.is_bot {
        payload.insert("bot".into(), String::new());
    }

    match target {
        EditTarget::Existing(id) => payload.insert("id".into(), id.to_string()),
        EditTarget::New(entity_type) => payload.insert("new".into(), entity_type.to_string()),
    };
    Ok(payload)
}

/// Fails with the API error carried by `response`, if any.
pub(crate) fn check_api_error(response: Value) -> WbiResult<Value> {
    let Some(error) = response.get("error") else {
        return Ok(response);
    };

    let conflict = error
        .get("messages")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|m| m.get("name").and_then(Value::as_str))
        .any(|name| name == LABEL_DESCRIPTION_CONFLICT);

    let response = ApiErrorResponse::new(response);
    warn!(code = response.code(), info = response.info(), conflict, "API reported an error");
    if conflict {
        Err(WbiError::NonUniqueLabelDescriptionPair(response))
    } else {
        Err(WbiError::GenericApi(response))
    }
}

pub(crate) fn classify_response(response: Value) -> WbiResult<AppliedEdit> {
    let response = check_api_error(response)?;

    let entity = response
        .get("entity")
        .cloned()
        .ok_or_else(|| WbiError::MalformedData("edit response has no entity".into()))?;
    let id = entity
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| WbiError::MalformedData("edit response entity has no id".into()))?
        .to_string();
    let lastrevid = if response.get("success").is_some() {
        entity.get("lastrevid").and_then(Value::as_u64)
    } else {
        None
    };

    Ok(AppliedEdit {
        id,
        lastrevid,
        entity,
    })
}
