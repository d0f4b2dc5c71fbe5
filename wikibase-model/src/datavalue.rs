use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// The typed value of a `value` snak.
///
/// Serialized adjacently tagged, matching the Wikibase JSON shape
/// `{"type": "wikibase-entityid", "value": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DataValue {
    #[serde(rename = "string")]
    String(String),
    #[serde(rename = "wikibase-entityid")]
    EntityId(EntityIdValue),
    #[serde(rename = "quantity")]
    Quantity(QuantityValue),
    #[serde(rename = "time")]
    Time(TimeValue),
    #[serde(rename = "monolingualtext")]
    MonolingualText(MonolingualTextValue),
    #[serde(rename = "globecoordinate")]
    GlobeCoordinate(GlobeCoordinateValue),
}

impl DataValue {
    /// Whether the value is free text, i.e. subject to case folding.
    pub fn is_textual(&self) -> bool {
        matches!(self, DataValue::String(_) | DataValue::MonolingualText(_))
    }
}

/// Reference to another entity (`wikibase-item`, `wikibase-property`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdValue {
    #[serde(rename = "entity-type")]
    pub entity_type: String,
    #[serde(rename = "numeric-id", default, skip_serializing_if = "Option::is_none")]
    pub numeric_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EntityIdValue {
    /// Builds a reference from a prefixed id such as `Q5`, `P31` or `L7-F1`.
    pub fn from_id(id: &str) -> ModelResult<Self> {
        let mut chars = id.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| ModelError::InvalidArgument("empty entity id".into()))?;
        let rest = chars.as_str();

        let entity_type = match (prefix, rest.split_once('-')) {
            ('L', Some((_, sub))) if sub.starts_with('F') => "form",
            ('L', Some((_, sub))) if sub.starts_with('S') => "sense",
            ('Q', None) => "item",
            ('P', None) => "property",
            ('L', None) => "lexeme",
            ('M', None) => "mediainfo",
            _ => {
                return Err(ModelError::InvalidArgument(format!(
                    "unrecognized entity id: {id}"
                )));
            }
        };

        let numeric_id = match entity_type {
            "form" | "sense" => None,
            _ => Some(rest.parse::<u64>().map_err(|_| {
                ModelError::InvalidArgument(format!("entity id has no numeric part: {id}"))
            })?),
        };

        Ok(Self {
            entity_type: entity_type.to_string(),
            numeric_id,
            id: Some(id.to_string()),
        })
    }

    /// Returns the prefixed id, reconstructing it from the numeric id when absent.
    pub fn resolved_id(&self) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(id.clone());
        }
        let prefix = match self.entity_type.as_str() {
            "item" => 'Q',
            "property" => 'P',
            "lexeme" => 'L',
            "mediainfo" => 'M',
            _ => return None,
        };
        self.numeric_id.map(|n| format!("{prefix}{n}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityValue {
    pub amount: String,
    /// `"1"` for unitless quantities, otherwise the unit's concept URI.
    pub unit: String,
    #[serde(rename = "upperBound", default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(rename = "lowerBound", default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValue {
    /// ISO-8601-like timestamp with explicit sign, e.g. `+2001-01-01T00:00:00Z`.
    pub time: String,
    pub timezone: i64,
    pub before: i64,
    pub after: i64,
    pub precision: u8,
    pub calendarmodel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonolingualTextValue {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeCoordinateValue {
    pub latitude: f64,
    pub longitude: f64,
    // Wikibase always emits these two, as `null` when unset.
    pub altitude: Option<f64>,
    pub precision: Option<f64>,
    pub globe: String,
}
