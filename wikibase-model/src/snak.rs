use crate::datavalue::{DataValue, EntityIdValue, MonolingualTextValue, QuantityValue};
use crate::error::ModelResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnakType {
    Value,
    SomeValue,
    NoValue,
}

/// A property paired with a value (or the `somevalue`/`novalue` markers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snak {
    pub snaktype: SnakType,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datavalue: Option<DataValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Snak {
    pub fn value(property: impl Into<String>, datavalue: DataValue, datatype: &str) -> Self {
        Self {
            snaktype: SnakType::Value,
            property: property.into(),
            hash: None,
            datavalue: Some(datavalue),
            datatype: Some(datatype.to_string()),
        }
    }

    pub fn some_value(property: impl Into<String>) -> Self {
        Self::marker(property, SnakType::SomeValue)
    }

    pub fn no_value(property: impl Into<String>) -> Self {
        Self::marker(property, SnakType::NoValue)
    }

    fn marker(property: impl Into<String>, snaktype: SnakType) -> Self {
        Self {
            snaktype,
            property: property.into(),
            hash: None,
            datavalue: None,
            datatype: None,
        }
    }

    pub fn string(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::value(property, DataValue::String(value.into()), "string")
    }

    pub fn external_id(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::value(property, DataValue::String(value.into()), "external-id")
    }

    pub fn item(property: impl Into<String>, id: &str) -> ModelResult<Self> {
        let value = EntityIdValue::from_id(id)?;
        Ok(Self::value(property, DataValue::EntityId(value), "wikibase-item"))
    }

    pub fn quantity(
        property: impl Into<String>,
        amount: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        let value = QuantityValue {
            amount: amount.into(),
            unit: unit.into(),
            upper_bound: None,
            lower_bound: None,
        };
        Self::value(property, DataValue::Quantity(value), "quantity")
    }

    pub fn monolingual_text(
        property: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let value = MonolingualTextValue {
            text: text.into(),
            language: language.into(),
        };
        Self::value(property, DataValue::MonolingualText(value), "monolingualtext")
    }

    /// Compares kind, property and value, ignoring the server-issued hash.
    pub fn same_content(&self, other: &Snak) -> bool {
        self.snaktype == other.snaktype
            && self.property == other.property
            && self.datavalue == other.datavalue
    }

    pub fn is_textual(&self) -> bool {
        self.datavalue.as_ref().is_some_and(DataValue::is_textual)
    }
}
