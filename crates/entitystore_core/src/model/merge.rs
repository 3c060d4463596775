//! Conflict resolution for entities saved under an existing identity key.
//!
//! # Invariants
//! - `merge` is pure: neither input is mutated, the result is a new value.
//! - An online entity is never downgraded back to offline.

use super::entity::{normalize_properties, Entity};

/// Combines a stored entity with an incoming update for the same `(list, id)`.
///
/// - `label`: incoming when present and non-empty, otherwise existing.
/// - `version`: always incoming.
/// - `properties`: existing overlaid with incoming, incoming wins per key.
/// - `offline`: stays `false` once the stored copy is online.
pub fn merge(existing: &Entity, incoming: Entity) -> Entity {
    let Entity {
        list,
        id,
        label,
        version,
        properties,
        offline,
    } = incoming;

    let label = match label {
        Some(label) if !label.is_empty() => Some(label),
        _ => existing.label.clone(),
    };

    let mut merged_properties = existing.properties.clone();
    merged_properties.extend(properties);

    Entity {
        list,
        id,
        label,
        version,
        properties: normalize_properties(merged_properties),
        offline: existing.offline && offline,
    }
}
