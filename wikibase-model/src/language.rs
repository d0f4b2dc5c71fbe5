//! Labels, descriptions and aliases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageValue {
    pub language: String,
    pub value: String,
}

impl LanguageValue {
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            value: value.into(),
        }
    }
}

/// A single term per language (labels, descriptions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageValues(BTreeMap<String, LanguageValue>);

impl LanguageValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(|v| v.value.as_str())
    }

    pub fn set(&mut self, language: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let language = language.into();
        self.0
            .insert(language.clone(), LanguageValue::new(language, value));
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Any number of alternative names per language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aliases(BTreeMap<String, Vec<LanguageValue>>);

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Vec<&str> {
        self.0
            .get(language)
            .map(|values| values.iter().map(|v| v.value.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn add(&mut self, language: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let language = language.into();
        self.0
            .entry(language.clone())
            .or_default()
            .push(LanguageValue::new(language, value));
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
