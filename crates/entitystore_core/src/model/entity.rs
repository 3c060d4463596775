//! Entity domain model.
//!
//! # Responsibility
//! - Define the record persisted by entity repositories.
//! - Provide validation and property normalization shared by every write path.
//!
//! # Invariants
//! - `(list, id)` is the identity key; both parts must be non-empty.
//! - Stored properties never repeat a key.
//! - `version` is writer-supplied and never incremented by the store.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identity key of a stored entity: `(list, id)`.
pub type EntityKey<'a> = (&'a str, &'a str);

/// Named, versioned record with string properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Partition the entity belongs to.
    pub list: String,
    /// Unique within `list`.
    pub id: String,
    /// Human-readable display name.
    pub label: Option<String>,
    /// Monotonic version supplied by the writer.
    pub version: i64,
    /// Ordered `(key, value)` pairs.
    pub properties: Vec<(String, String)>,
    /// Locally created and not yet synced.
    pub offline: bool,
}

impl Entity {
    /// Creates an online entity without label or properties.
    pub fn new(list: impl Into<String>, id: impl Into<String>, version: i64) -> Self {
        Self {
            list: list.into(),
            id: id.into(),
            label: None,
            version,
            properties: Vec::new(),
            offline: false,
        }
    }

    /// Creates a locally authored entity with a generated id.
    ///
    /// # Invariants
    /// - `id` is a fresh UUID v4 string.
    /// - `offline` starts as `true` until a synced copy overwrites it.
    pub fn new_offline(list: impl Into<String>, version: i64) -> Self {
        Self::new(list, Uuid::new_v4().to_string(), version).with_offline(true)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Returns the `(list, id)` identity key.
    pub fn key(&self) -> EntityKey<'_> {
        (self.list.as_str(), self.id.as_str())
    }

    /// Looks up the value stored for `key`, honouring last-write-wins order.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Validates identity fields before persistence.
    ///
    /// # Errors
    /// - `EmptyList` when `list` is empty.
    /// - `EmptyId` when `id` is empty.
    ///
    /// Whitespace is significant and accepted as-is.
    pub fn validate(&self) -> Result<(), EntityValidationError> {
        if self.list.is_empty() {
            return Err(EntityValidationError::EmptyList {
                id: self.id.clone(),
            });
        }
        if self.id.is_empty() {
            return Err(EntityValidationError::EmptyId {
                list: self.list.clone(),
            });
        }
        Ok(())
    }
}

/// Domain validation errors for entity identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    EmptyList { id: String },
    EmptyId { list: String },
    EmptyListName,
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyList { id } => write!(f, "entity `{id}` has an empty list name"),
            Self::EmptyId { list } => write!(f, "entity in list `{list}` has an empty id"),
            Self::EmptyListName => write!(f, "list name must not be empty"),
        }
    }
}

impl Error for EntityValidationError {}

/// Rejects empty list names passed to list-level operations.
pub fn validate_list_name(list: &str) -> Result<(), EntityValidationError> {
    if list.is_empty() {
        return Err(EntityValidationError::EmptyListName);
    }
    Ok(())
}

/// Collapses duplicate property keys.
///
/// The last value per key wins; each key keeps the position of its first
/// occurrence.
pub fn normalize_properties(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut normalized: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match normalized.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => normalized.push((key, value)),
        }
    }
    normalized
}
