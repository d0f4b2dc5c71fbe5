use crate::error::{ModelError, ModelResult};
use crate::snak::Snak;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

/// A set of snaks backing a claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub snaks: BTreeMap<String, Vec<Snak>>,
    #[serde(rename = "snaks-order", default, skip_serializing_if = "Option::is_none")]
    pub snaks_order: Option<Vec<String>>,
}

impl Reference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snak(mut self, snak: Snak) -> Self {
        self.snaks.entry(snak.property.clone()).or_default().push(snak);
        self
    }

    pub fn iter_snaks(&self) -> impl Iterator<Item = &Snak> {
        self.snaks.values().flatten()
    }
}

/// A single statement: main snak, qualifiers, references, rank and statement id.
///
/// A claim without an `id` has never been saved. The removal flag marks a saved
/// claim for deletion on the next write and can only be set on claims with an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub mainsnak: Snak,
    #[serde(rename = "type", default = "statement_type")]
    pub claim_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifiers: Option<BTreeMap<String, Vec<Snak>>>,
    #[serde(rename = "qualifiers-order", default, skip_serializing_if = "Option::is_none")]
    pub qualifiers_order: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
    #[serde(
        rename = "remove",
        default,
        skip_serializing_if = "is_false",
        with = "remove_flag"
    )]
    removed: bool,
}

fn statement_type() -> String {
    "statement".to_string()
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// The wire form marks removal by the presence of `"remove": ""`.
mod remove_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(_flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(true)
    }
}

impl Claim {
    pub fn new(mainsnak: Snak) -> Self {
        Self {
            mainsnak,
            claim_type: statement_type(),
            id: None,
            rank: None,
            qualifiers: None,
            qualifiers_order: None,
            references: None,
            removed: false,
        }
    }

    /// Shorthand for a `string` claim.
    pub fn string(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Snak::string(property, value))
    }

    /// Shorthand for a `wikibase-item` claim.
    pub fn item(property: impl Into<String>, id: &str) -> ModelResult<Self> {
        Ok(Self::new(Snak::item(property, id)?))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_qualifier(mut self, snak: Snak) -> Self {
        let property = snak.property.clone();
        self.qualifiers
            .get_or_insert_with(BTreeMap::new)
            .entry(property.clone())
            .or_default()
            .push(snak);
        let order = self.qualifiers_order.get_or_insert_with(Vec::new);
        if !order.contains(&property) {
            order.push(property);
        }
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.get_or_insert_with(Vec::new).push(reference);
        self
    }

    pub fn property(&self) -> &str {
        &self.mainsnak.property
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Marks the claim for deletion on the next write.
    pub fn remove(&mut self) -> ModelResult<()> {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => {
                self.removed = true;
                Ok(())
            }
            _ => Err(ModelError::InvalidArgument(format!(
                "cannot remove an unsaved claim on {}",
                self.property()
            ))),
        }
    }

    pub fn iter_qualifiers(&self) -> impl Iterator<Item = &Snak> {
        self.qualifiers.iter().flat_map(|q| q.values().flatten())
    }

    pub fn iter_references(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().flatten()
    }

    /// Same main snak and same qualifiers, regardless of id, rank, references and hashes.
    pub fn same_statement(&self, other: &Claim) -> bool {
        if !self.mainsnak.same_content(&other.mainsnak) {
            return false;
        }
        let empty = BTreeMap::new();
        let ours = self.qualifiers.as_ref().unwrap_or(&empty);
        let theirs = other.qualifiers.as_ref().unwrap_or(&empty);
        ours.len() == theirs.len()
            && ours.iter().all(|(property, snaks)| {
                theirs.get(property).is_some_and(|other_snaks| {
                    snaks.len() == other_snaks.len()
                        && snaks
                            .iter()
                            .zip(other_snaks)
                            .all(|(a, b)| a.same_content(b))
                })
            })
    }

    /// Only called on claims known to carry a statement id.
    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
    }

    pub(crate) fn check_invariants(&self) -> ModelResult<()> {
        if self.removed && self.id.as_deref().is_none_or(str::is_empty) {
            return Err(ModelError::MalformedData(format!(
                "claim on {} is flagged for removal but has no statement id",
                self.property()
            )));
        }
        Ok(())
    }

    /// Takes over `incoming`, keeping this claim's statement id when `incoming` has none.
    pub(crate) fn absorb(&mut self, incoming: Claim) {
        let id = incoming.id.clone().or_else(|| self.id.take());
        *self = incoming;
        self.id = id;
    }

    pub fn from_wire(data: &serde_json::Value) -> ModelResult<Self> {
        let claim: Claim = serde_json::from_value(data.clone())
            .map_err(|e| ModelError::malformed("invalid claim", e))?;
        claim.check_invariants()?;
        Ok(claim)
    }

    pub fn to_wire(&self) -> serde_json::Value {
        // Every field is a plain map, string or number; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
