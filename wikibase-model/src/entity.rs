use crate::claims::{ActionIfExists, ClaimBatch, Claims};
use crate::error::{ModelError, ModelResult};
use crate::language::{Aliases, LanguageValues};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

/// The entity kind tag (`type` in the wire form).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    Item,
    Property,
    Lexeme,
    MediaInfo,
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Item => "item",
            EntityType::Property => "property",
            EntityType::Lexeme => "lexeme",
            EntityType::MediaInfo => "mediainfo",
            EntityType::Other(tag) => tag,
        }
    }
}

impl From<&str> for EntityType {
    fn from(tag: &str) -> Self {
        match tag {
            "item" => EntityType::Item,
            "property" => EntityType::Property,
            "lexeme" => EntityType::Lexeme,
            "mediainfo" => EntityType::MediaInfo,
            other => EntityType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Wikibase entity as held by the client.
///
/// `id` stays `None` until the first successful write; its absence in the wire
/// form is what tells the server to create rather than edit. `lastrevid` is the
/// revision the local copy was read at, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: Option<String>,
    pub entity_type: EntityType,
    pub lastrevid: Option<u64>,
    pub labels: Option<LanguageValues>,
    pub descriptions: Option<LanguageValues>,
    pub aliases: Option<Aliases>,
    /// Property datatype, only meaningful for property entities.
    pub datatype: Option<String>,
    pub claims: Claims,
}

impl Entity {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            id: None,
            entity_type,
            lastrevid: None,
            labels: None,
            descriptions: None,
            aliases: None,
            datatype: None,
            claims: Claims::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn add_claims(
        &mut self,
        claims: impl Into<ClaimBatch>,
        if_exists: ActionIfExists,
    ) -> ModelResult<&mut Self> {
        self.claims.add(claims, if_exists)?;
        Ok(self)
    }

    pub fn labels_mut(&mut self) -> &mut LanguageValues {
        self.labels.get_or_insert_with(LanguageValues::new)
    }

    pub fn descriptions_mut(&mut self) -> &mut LanguageValues {
        self.descriptions.get_or_insert_with(LanguageValues::new)
    }

    pub fn aliases_mut(&mut self) -> &mut Aliases {
        self.aliases.get_or_insert_with(Aliases::new)
    }

    /// `{type, id?, labels?, descriptions?, aliases?, datatype?, claims}`.
    pub fn to_wire(&self) -> Value {
        let mut body = Map::new();
        body.insert("type".into(), Value::String(self.entity_type.to_string()));
        if let Some(id) = &self.id {
            body.insert("id".into(), Value::String(id.clone()));
        }
        insert_terms(&mut body, "labels", self.labels.as_ref());
        insert_terms(&mut body, "descriptions", self.descriptions.as_ref());
        insert_terms(&mut body, "aliases", self.aliases.as_ref());
        if let Some(datatype) = &self.datatype {
            body.insert("datatype".into(), Value::String(datatype.clone()));
        }
        body.insert("claims".into(), self.claims.to_wire());
        Value::Object(body)
    }

    /// Hydrates an entity from a `wbgetentities` entry or an edit body.
    pub fn from_wire(data: &Value) -> ModelResult<Self> {
        let object = data
            .as_object()
            .ok_or_else(|| ModelError::MalformedData("entity body is not an object".into()))?;

        if object.contains_key("missing") {
            let id = object
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>");
            return Err(ModelError::NotFound(id.to_string()));
        }

        let entity_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::MalformedData("entity has no `type`".into()))?;

        let id = match object.get("id") {
            None => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(ModelError::MalformedData(format!(
                    "entity `id` is not a string: {other}"
                )));
            }
        };

        let lastrevid = match object.get("lastrevid") {
            None => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                ModelError::MalformedData(format!("entity `lastrevid` is not a revision: {value}"))
            })?),
        };

        let datatype = match object.get("datatype") {
            None => None,
            Some(Value::String(datatype)) => Some(datatype.clone()),
            Some(other) => {
                return Err(ModelError::MalformedData(format!(
                    "entity `datatype` is not a string: {other}"
                )));
            }
        };

        let claims = object
            .get("claims")
            .ok_or_else(|| ModelError::MalformedData("entity has no `claims`".into()))?;

        Ok(Self {
            id,
            entity_type: EntityType::from(entity_type),
            lastrevid,
            labels: decode_terms(object, "labels")?,
            descriptions: decode_terms(object, "descriptions")?,
            aliases: decode_terms(object, "aliases")?,
            datatype,
            claims: Claims::from_wire(claims)?,
        })
    }
}

fn insert_terms<T: serde::Serialize>(body: &mut Map<String, Value>, field: &str, terms: Option<&T>) {
    if let Some(terms) = terms {
        if let Ok(value) = serde_json::to_value(terms) {
            body.insert(field.to_string(), value);
        }
    }
}

fn decode_terms<T: DeserializeOwned + Default>(
    object: &Map<String, Value>,
    field: &str,
) -> ModelResult<Option<T>> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::Array(items)) if items.is_empty() => Ok(Some(T::default())),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ModelError::malformed(&format!("invalid `{field}`"), e)),
    }
}
