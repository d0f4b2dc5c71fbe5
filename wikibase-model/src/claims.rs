use crate::claim::Claim;
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What to do when a property already holds claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionIfExists {
    /// Append unconditionally, never deduplicating.
    #[default]
    Append,
    /// Match incoming claims against existing ones and retire the rest.
    Replace,
    /// Discard the incoming claim if the property already has a live claim.
    Keep,
}

/// One or more claims handed to [`Claims::add`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimBatch(Vec<Claim>);

impl ClaimBatch {
    pub fn into_inner(self) -> Vec<Claim> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Claim> for ClaimBatch {
    fn from(claim: Claim) -> Self {
        Self(vec![claim])
    }
}

impl From<Vec<Claim>> for ClaimBatch {
    fn from(claims: Vec<Claim>) -> Self {
        Self(claims)
    }
}

impl From<&[Claim]> for ClaimBatch {
    fn from(claims: &[Claim]) -> Self {
        Self(claims.to_vec())
    }
}

impl<const N: usize> From<[Claim; N]> for ClaimBatch {
    fn from(claims: [Claim; N]) -> Self {
        Self(claims.into())
    }
}

/// Claims keyed by property id.
///
/// Order within a property is preserved and is what the wire form emits.
/// Order across properties is not part of the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims {
    claims: BTreeMap<String, Vec<Claim>>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `claims` into the store according to `if_exists`.
    ///
    /// With [`ActionIfExists::Replace`], incoming claims carrying a statement id
    /// are matched by that id, the rest against an equal unmatched statement; a match is
    /// updated in place and anything else is appended. Existing claims of the
    /// touched properties that nothing matched are flagged for removal when
    /// saved and dropped when unsaved. Replacing twice with the same batch
    /// leaves the store unchanged.
    pub fn add(
        &mut self,
        claims: impl Into<ClaimBatch>,
        if_exists: ActionIfExists,
    ) -> ModelResult<&mut Self> {
        let batch = claims.into();
        if batch.is_empty() {
            return Err(ModelError::InvalidArgument("no claims given".into()));
        }
        let batch = batch.into_inner();
        for claim in &batch {
            claim.check_invariants().map_err(|e| match e {
                ModelError::MalformedData(msg) => ModelError::InvalidArgument(msg),
                other => other,
            })?;
        }

        match if_exists {
            ActionIfExists::Append => {
                for claim in batch {
                    self.claims
                        .entry(claim.property().to_string())
                        .or_default()
                        .push(claim);
                }
            }
            ActionIfExists::Keep => {
                for claim in batch {
                    let existing = self.claims.entry(claim.property().to_string()).or_default();
                    if existing.iter().all(Claim::is_removed) {
                        existing.push(claim);
                    }
                }
            }
            ActionIfExists::Replace => {
                let mut by_property: BTreeMap<String, Vec<Claim>> = BTreeMap::new();
                for claim in batch {
                    by_property
                        .entry(claim.property().to_string())
                        .or_default()
                        .push(claim);
                }
                for (property, incoming) in by_property {
                    self.replace_property(property, incoming);
                }
            }
        }

        Ok(self)
    }

    fn replace_property(&mut self, property: String, incoming: Vec<Claim>) {
        let existing = self.claims.entry(property.clone()).or_default();
        let mut matched = vec![false; existing.len()];

        // Statement ids first, so equality matching never claims a slot an id targets.
        let (with_id, without_id): (Vec<Claim>, Vec<Claim>) =
            incoming.into_iter().partition(|c| c.id.is_some());

        for claim in with_id.into_iter().chain(without_id) {
            let position = match claim.id.as_deref() {
                Some(id) => existing.iter().position(|c| c.id.as_deref() == Some(id)),
                None => existing
                    .iter()
                    .enumerate()
                    .position(|(i, c)| !matched[i] && c.same_statement(&claim)),
            };
            match position {
                Some(i) => {
                    existing[i].absorb(claim);
                    matched[i] = true;
                }
                None => {
                    existing.push(claim);
                    matched.push(true);
                }
            }
        }

        let retained: Vec<Claim> = existing
            .drain(..)
            .zip(matched)
            .filter_map(|(mut claim, matched)| {
                if matched {
                    Some(claim)
                } else if claim.id.is_some() {
                    claim.mark_removed();
                    Some(claim)
                } else {
                    None
                }
            })
            .collect();

        if retained.is_empty() {
            self.claims.remove(&property);
        } else {
            *existing = retained;
        }
    }

    /// Claims recorded for `property`, in insertion order.
    pub fn get(&self, property: &str) -> &[Claim] {
        self.claims.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_mut(&mut self, property: &str) -> Option<&mut Vec<Claim>> {
        self.claims.get_mut(property)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.values().flatten()
    }

    /// Total number of claims, including those flagged for removal.
    pub fn len(&self) -> usize {
        self.claims.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.values().all(Vec::is_empty)
    }

    /// `{propertyId: [claim, ...]}`.
    pub fn to_wire(&self) -> Value {
        Value::Object(
            self.claims
                .iter()
                .map(|(property, claims)| {
                    (
                        property.clone(),
                        Value::Array(claims.iter().map(Claim::to_wire).collect()),
                    )
                })
                .collect(),
        )
    }

    pub fn from_wire(data: &Value) -> ModelResult<Self> {
        let object = match data {
            Value::Object(object) => object,
            // PHP serializes an empty map as `[]`.
            Value::Array(items) if items.is_empty() => return Ok(Self::new()),
            _ => {
                return Err(ModelError::MalformedData(
                    "claims must be an object keyed by property id".into(),
                ));
            }
        };

        let mut claims = BTreeMap::new();
        for (property, items) in object {
            let items = items.as_array().ok_or_else(|| {
                ModelError::MalformedData(format!("claims for {property} are not a list"))
            })?;
            let mut parsed = Vec::with_capacity(items.len());
            for item in items {
                let has_property = item
                    .get("mainsnak")
                    .and_then(|snak| snak.get("property"))
                    .is_some_and(Value::is_string);
                if !has_property {
                    return Err(ModelError::MalformedData(format!(
                        "claim under {property} has no property id"
                    )));
                }
                let claim = Claim::from_wire(item)?;
                if claim.property() != property {
                    return Err(ModelError::MalformedData(format!(
                        "claim for {} listed under {property}",
                        claim.property()
                    )));
                }
                parsed.push(claim);
            }
            claims.insert(property.clone(), parsed);
        }

        Ok(Self { claims })
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Claims::from_wire(&value).map_err(serde::de::Error::custom)
    }
}
