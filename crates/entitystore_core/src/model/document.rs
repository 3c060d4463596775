//! Persisted document shape for entity repositories.
//!
//! # Responsibility
//! - Hold the full set of lists and entities read from or written to storage.
//! - Apply upserts and deletions to an owned, freshly loaded document.
//!
//! # Invariants
//! - A list key may map to zero records; empty lists are persisted.
//! - Within one list no two records share an `id`.
//! - Record order inside a list is storage order.

use super::entity::{normalize_properties, Entity};
use super::merge::merge;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from list name to the ordered records stored in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityDocument {
    lists: BTreeMap<String, Vec<EntityRecord>>,
}

/// On-disk shape of one entity; the list name is the enclosing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub version: i64,
    #[serde(default, with = "ordered_properties")]
    pub properties: Vec<(String, String)>,
    #[serde(default)]
    pub offline: bool,
}

impl EntityRecord {
    pub fn into_entity(self, list: &str) -> Entity {
        Entity {
            list: list.to_string(),
            id: self.id,
            label: self.label,
            version: self.version,
            properties: self.properties,
            offline: self.offline,
        }
    }
}

impl From<Entity> for EntityRecord {
    fn from(entity: Entity) -> Self {
        Self {
            id: entity.id,
            label: entity.label,
            version: entity.version,
            properties: normalize_properties(entity.properties),
            offline: entity.offline,
        }
    }
}

/// What `EntityDocument::upsert` did with an incoming entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
}

/// Per-batch tally of upsert outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub merged: usize,
}

impl UpsertSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Merged => self.merged += 1,
        }
    }
}

impl EntityDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_names(&self) -> BTreeSet<String> {
        self.lists.keys().cloned().collect()
    }

    pub fn contains_list(&self, list: &str) -> bool {
        self.lists.contains_key(list)
    }

    /// Returns entities of `list` in storage order; unknown lists are empty.
    pub fn entities(&self, list: &str) -> Vec<Entity> {
        self.lists
            .get(list)
            .map(|records| {
                records
                    .iter()
                    .cloned()
                    .map(|record| record.into_entity(list))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn entity_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Adds `list` as an empty partition. Returns `false` if it already existed.
    pub fn ensure_list(&mut self, list: &str) -> bool {
        if self.lists.contains_key(list) {
            return false;
        }
        self.lists.insert(list.to_string(), Vec::new());
        true
    }

    /// Inserts `incoming`, or replaces the stored record with the same
    /// `(list, id)` by the merge of both. A replaced record keeps its position.
    pub fn upsert(&mut self, incoming: Entity) -> UpsertOutcome {
        let (list, id) = incoming.key();
        let position = self
            .lists
            .get(list)
            .and_then(|records| records.iter().position(|record| record.id == id));
        let list = list.to_string();
        let records = self.lists.entry(list.clone()).or_default();

        match position {
            Some(index) => {
                let existing = records[index].clone().into_entity(&list);
                records[index] = EntityRecord::from(merge(&existing, incoming));
                UpsertOutcome::Merged
            }
            None => {
                records.push(EntityRecord::from(incoming));
                UpsertOutcome::Inserted
            }
        }
    }

    /// Upserts `entities` in order; later entries see earlier ones.
    pub fn upsert_all(&mut self, entities: &[Entity]) -> UpsertSummary {
        let mut summary = UpsertSummary::default();
        for entity in entities {
            summary.record(self.upsert(entity.clone()));
        }
        summary
    }

    /// Removes every record whose id equals `id`, in every list.
    ///
    /// Lists left without records are kept. Returns the number removed.
    pub fn remove_id(&mut self, id: &str) -> usize {
        let mut removed = 0;
        for records in self.lists.values_mut() {
            let before = records.len();
            records.retain(|record| record.id != id);
            removed += before - records.len();
        }
        removed
    }
}

/// Serializes properties as a JSON object while keeping pair order.
mod ordered_properties {
    use crate::model::entity::normalize_properties;
    use serde::de::{Deserialize, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(properties: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(properties.len()))?;
        for (key, value) in properties {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PropertiesVisitor)
    }

    struct PropertiesVisitor;

    impl<'de> Visitor<'de> for PropertiesVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of string keys to scalar values")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, PropertyValue(value))) =
                access.next_entry::<String, PropertyValue>()?
            {
                pairs.push((key, value));
            }
            Ok(normalize_properties(pairs))
        }
    }

    /// Property value read from any JSON scalar, kept in its textual form.
    struct PropertyValue(String);

    impl<'de> Deserialize<'de> for PropertyValue {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(PropertyValueVisitor)
        }
    }

    struct PropertyValueVisitor;

    impl<'de> Visitor<'de> for PropertyValueVisitor {
        type Value = PropertyValue;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PropertyValue(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PropertyValue(value))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PropertyValue(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PropertyValue(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PropertyValue(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PropertyValue(value.to_string()))
        }
    }
}
