//! Entity use-case service.
//!
//! # Responsibility
//! - Provide entry points for callers that record and sync entities.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::entity::{normalize_properties, Entity};
use crate::repo::entity_repo::{EntitiesRepository, RepoResult};
use std::collections::BTreeSet;

/// Use-case service wrapper for entity storage.
pub struct EntityService<R: EntitiesRepository> {
    repo: R,
}

impl<R: EntitiesRepository> EntityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn lists(&self) -> RepoResult<BTreeSet<String>> {
        self.repo.get_lists()
    }

    pub fn entities(&self, list: &str) -> RepoResult<Vec<Entity>> {
        self.repo.get_entities(list)
    }

    pub fn add_list(&self, list: &str) -> RepoResult<()> {
        self.repo.add_list(list)
    }

    pub fn save(&self, entity: Entity) -> RepoResult<()> {
        self.repo.save(std::slice::from_ref(&entity))
    }

    /// Saves a batch with one read and one write.
    pub fn save_all(&self, entities: &[Entity]) -> RepoResult<()> {
        self.repo.save(entities)
    }

    /// Records a locally authored entity and returns it as stored.
    ///
    /// # Contract
    /// - The entity gets a fresh UUID id, version `1` and `offline = true`.
    /// - `list` is created if it did not exist.
    pub fn create_offline_entity(
        &self,
        list: &str,
        label: impl Into<String>,
        properties: Vec<(String, String)>,
    ) -> RepoResult<Entity> {
        let mut entity = Entity::new_offline(list, 1).with_label(label);
        entity.properties = normalize_properties(properties);
        self.repo.save(std::slice::from_ref(&entity))?;
        Ok(entity)
    }

    /// Removes every entity with `id` regardless of list.
    pub fn delete(&self, id: &str) -> RepoResult<()> {
        self.repo.delete(id)
    }

    pub fn clear(&self) -> RepoResult<()> {
        self.repo.clear()
    }
}
