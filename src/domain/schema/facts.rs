//! The accumulated fact store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{catalog, FactValue, FieldDefinition, SectionId};

/// Mapping from field name to its filled-in value.
///
/// An absent key is an unknown (null) fact. Values only ever move from
/// unknown to known or get overwritten by a later non-null extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet(BTreeMap<String, FactValue>);

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FactValue> {
        self.0.get(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Boolean value of a fact, `None` while unknown.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FactValue::as_bool)
    }

    pub fn set(&mut self, name: impl Into<String>, value: FactValue) {
        self.0.insert(name.into(), value);
    }

    /// Merges `other` over `self`; every key in `other` wins.
    pub fn merge(&mut self, other: FactSet) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON object with every field of `fields`, unknown ones as `null`.
    pub fn snapshot_of(&self, fields: &[FieldDefinition]) -> Value {
        let map: Map<String, Value> = fields
            .iter()
            .map(|f| {
                let value = self.get(f.name).map(FactValue::to_json).unwrap_or(Value::Null);
                (f.name.to_string(), value)
            })
            .collect();
        Value::Object(map)
    }

    /// Snapshot of one section's fields.
    pub fn section_snapshot(&self, section: SectionId) -> Value {
        self.snapshot_of(section.fields())
    }

    /// Every known fact as compact JSON text, keys in catalog order.
    ///
    /// Rendered by hand because `serde_json::Map` sorts its keys.
    pub fn known_json(&self) -> String {
        let entries: Vec<String> = self
            .known_in_catalog_order()
            .map(|(name, value)| format!("{}:{}", Value::from(name), value.to_json()))
            .collect();
        format!("{{{}}}", entries.join(","))
    }

    /// Known facts ordered as the catalog declares them.
    pub fn known_in_catalog_order(&self) -> impl Iterator<Item = (&'static str, &FactValue)> {
        catalog::all_fields().filter_map(move |f| self.get(f.name).map(|v| (f.name, v)))
    }
}

impl FromIterator<(String, FactValue)> for FactSet {
    fn from_iter<I: IntoIterator<Item = (String, FactValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
