//! In-memory entity repository.
//!
//! Shares upsert and merge rules with the file-backed store through
//! `EntityDocument`; nothing is persisted.

use super::entity_repo::{EntitiesRepository, RepoResult};
use crate::model::document::EntityDocument;
use crate::model::entity::{validate_list_name, Entity};
use log::debug;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct InMemoryEntitiesRepository {
    document: Mutex<EntityDocument>,
}

impl InMemoryEntitiesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn document(&self) -> MutexGuard<'_, EntityDocument> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EntitiesRepository for InMemoryEntitiesRepository {
    fn get_lists(&self) -> RepoResult<BTreeSet<String>> {
        Ok(self.document().list_names())
    }

    fn get_entities(&self, list: &str) -> RepoResult<Vec<Entity>> {
        Ok(self.document().entities(list))
    }

    fn add_list(&self, list: &str) -> RepoResult<()> {
        validate_list_name(list)?;
        self.document().ensure_list(list);
        Ok(())
    }

    fn save(&self, entities: &[Entity]) -> RepoResult<()> {
        for entity in entities {
            entity.validate()?;
        }

        let summary = self.document().upsert_all(entities);
        debug!(
            "event=entity_save module=memory_repo status=ok inserted={} merged={}",
            summary.inserted, summary.merged
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.document().remove_id(id);
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        *self.document() = EntityDocument::new();
        Ok(())
    }
}
