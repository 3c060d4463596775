//! Embedded persistence for named, versioned entities grouped into lists.
//! This crate is the single source of truth for store invariants.

pub mod logging;
pub mod model;
pub mod path;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{EntityDocument, EntityRecord, UpsertOutcome, UpsertSummary};
pub use model::entity::{normalize_properties, Entity, EntityValidationError};
pub use model::merge::merge;
pub use path::safe_path::{
    inspect, resolve_absolute_path, resolve_contained, ContainmentMode, ContainmentViolation,
    PathResolution, SafePathResolver,
};
pub use repo::entity_repo::{
    EntitiesRepository, JsonFileEntitiesRepository, RepoError, RepoResult,
};
pub use repo::memory_repo::InMemoryEntitiesRepository;
pub use service::entity_service::EntityService;
pub use storage::{
    CodecError, CorruptionPolicy, DocumentCodec, FileSystem, JsonDocumentCodec, LocalFileSystem,
    RecoveryAction, StoreConfig, DEFAULT_FILE_NAME,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
