//! Entity repository contract and file-backed implementation.
//!
//! # Responsibility
//! - Provide list-partitioned upsert storage over one serialized document.
//! - Keep file layout, codec and recovery details inside the repository.
//!
//! # Invariants
//! - Every operation reads the whole document; every mutation rewrites it once.
//! - Write paths validate input before touching storage.
//! - A document that fails to decode is handled by `CorruptionPolicy` only;
//!   all other I/O failures propagate unchanged.
//! - No state is cached between calls.
//!
//! All operations block on file I/O and must not run on a latency-sensitive
//! thread. Concurrent writers against the same file are not synchronized.

use crate::model::document::EntityDocument;
use crate::model::entity::{validate_list_name, Entity, EntityValidationError};
use crate::path::safe_path::ContainmentViolation;
use crate::storage::codec::{CodecError, DocumentCodec, JsonDocumentCodec};
use crate::storage::config::StoreConfig;
use crate::storage::fs::{FileSystem, LocalFileSystem};
use crate::storage::recovery::{CorruptionPolicy, RecoveryAction};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntityValidationError),
    Containment(ContainmentViolation),
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    Codec(CodecError),
    /// Backing document failed to decode under `CorruptionPolicy::Strict`.
    Corrupt {
        path: PathBuf,
        source: CodecError,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Containment(err) => write!(f, "{err}"),
            Self::Io {
                operation,
                path,
                source,
            } => write!(f, "failed to {operation} `{}`: {source}", path.display()),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Corrupt { path, source } => {
                write!(f, "entity document `{}` is corrupt: {source}", path.display())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Containment(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Codec(err) => Some(err),
            Self::Corrupt { source, .. } => Some(source),
        }
    }
}

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ContainmentViolation> for RepoError {
    fn from(value: ContainmentViolation) -> Self {
        Self::Containment(value)
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Repository interface for list-partitioned entity storage.
pub trait EntitiesRepository {
    /// Every list name present, including lists without entities.
    fn get_lists(&self) -> RepoResult<BTreeSet<String>>;
    /// Entities of `list` in storage order.
    fn get_entities(&self, list: &str) -> RepoResult<Vec<Entity>>;
    /// Adds `list` as an empty partition unless it already exists.
    fn add_list(&self, list: &str) -> RepoResult<()>;
    /// Inserts or merges each entity in argument order, then persists once.
    fn save(&self, entities: &[Entity]) -> RepoResult<()>;
    /// Removes every entity with `id`, in every list.
    fn delete(&self, id: &str) -> RepoResult<()>;
    /// Drops all stored data.
    fn clear(&self) -> RepoResult<()>;
}

/// Entity repository persisted as one JSON document on local storage.
#[derive(Debug)]
pub struct JsonFileEntitiesRepository<F = LocalFileSystem, C = JsonDocumentCodec> {
    entities_file: PathBuf,
    corruption_policy: CorruptionPolicy,
    fs: F,
    codec: C,
}

impl JsonFileEntitiesRepository {
    /// Opens a store in `directory` with default settings.
    pub fn try_new(directory: impl Into<PathBuf>) -> RepoResult<Self> {
        Self::open(&StoreConfig::new(directory))
    }

    /// Opens a store on the local file system using `config`.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let codec = JsonDocumentCodec::new().with_pretty(config.pretty);
        Self::with_parts(config, LocalFileSystem, codec)
    }
}

impl<F: FileSystem, C: DocumentCodec> JsonFileEntitiesRepository<F, C> {
    /// Builds a store over caller-supplied file system and codec.
    ///
    /// No file is touched until the first operation.
    ///
    /// # Errors
    /// - Returns `Containment` when the configured file escapes `base_dir`
    ///   in enforce mode.
    pub fn with_parts(config: &StoreConfig, fs: F, codec: C) -> RepoResult<Self> {
        let entities_file = config.backing_file()?;
        info!(
            "event=store_open module=repo status=ok path={} corruption_policy={:?}",
            entities_file.display(),
            config.corruption_policy
        );

        Ok(Self {
            entities_file,
            corruption_policy: config.corruption_policy,
            fs,
            codec,
        })
    }

    pub fn backing_file(&self) -> &Path {
        &self.entities_file
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    fn read_document(&self) -> RepoResult<EntityDocument> {
        let started_at = Instant::now();
        if !self.fs.exists(&self.entities_file) {
            self.create_file()?;
        }

        let bytes = self
            .fs
            .read(&self.entities_file)
            .map_err(|source| self.io_error("read", source))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(EntityDocument::new());
        }

        match self.codec.decode(&bytes) {
            Ok(document) => {
                debug!(
                    "event=store_read module=repo status=ok lists={} entities={} duration_ms={}",
                    document.list_names().len(),
                    document.entity_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(document)
            }
            Err(err) => self.recover(err),
        }
    }

    fn recover(&self, err: CodecError) -> RepoResult<EntityDocument> {
        match self.corruption_policy.action_for(&err) {
            RecoveryAction::ResetToEmpty => {
                warn!(
                    "event=store_recover module=repo status=reset path={} error={}",
                    self.entities_file.display(),
                    err
                );
                self.fs
                    .remove_file(&self.entities_file)
                    .map_err(|source| self.io_error("delete", source))?;
                self.create_file()?;
                Ok(EntityDocument::new())
            }
            RecoveryAction::Propagate => {
                error!(
                    "event=store_recover module=repo status=error error_code=document_corrupt path={} error={}",
                    self.entities_file.display(),
                    err
                );
                Err(RepoError::Corrupt {
                    path: self.entities_file.clone(),
                    source: err,
                })
            }
        }
    }

    fn write_document(&self, document: &EntityDocument) -> RepoResult<()> {
        let started_at = Instant::now();
        let bytes = self.codec.encode(document)?;
        if let Err(source) = self.fs.write(&self.entities_file, &bytes) {
            error!(
                "event=store_write module=repo status=error path={} error={}",
                self.entities_file.display(),
                source
            );
            return Err(self.io_error("write", source));
        }

        debug!(
            "event=store_write module=repo status=ok bytes={} duration_ms={}",
            bytes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn create_file(&self) -> RepoResult<()> {
        if let Some(parent) = self.entities_file.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs
                    .create_dir_all(parent)
                    .map_err(|source| self.io_error("create directories for", source))?;
            }
        }
        self.fs
            .create_file(&self.entities_file)
            .map_err(|source| self.io_error("create", source))
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> RepoError {
        RepoError::Io {
            operation,
            path: self.entities_file.clone(),
            source,
        }
    }
}

impl<F: FileSystem, C: DocumentCodec> EntitiesRepository for JsonFileEntitiesRepository<F, C> {
    fn get_lists(&self) -> RepoResult<BTreeSet<String>> {
        Ok(self.read_document()?.list_names())
    }

    fn get_entities(&self, list: &str) -> RepoResult<Vec<Entity>> {
        Ok(self.read_document()?.entities(list))
    }

    fn add_list(&self, list: &str) -> RepoResult<()> {
        validate_list_name(list)?;

        let mut document = self.read_document()?;
        if document.ensure_list(list) {
            self.write_document(&document)?;
            info!("event=list_add module=repo status=ok list={list}");
        }
        Ok(())
    }

    fn save(&self, entities: &[Entity]) -> RepoResult<()> {
        if entities.is_empty() {
            return Ok(());
        }
        for entity in entities {
            entity.validate()?;
        }

        let mut document = self.read_document()?;
        let summary = document.upsert_all(entities);
        self.write_document(&document)?;

        info!(
            "event=entity_save module=repo status=ok inserted={} merged={}",
            summary.inserted, summary.merged
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        let mut document = self.read_document()?;
        let removed = document.remove_id(id);
        if removed > 0 {
            self.write_document(&document)?;
        }

        info!("event=entity_delete module=repo status=ok removed={removed}");
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.fs
            .remove_file(&self.entities_file)
            .map_err(|source| self.io_error("delete", source))?;

        info!(
            "event=store_clear module=repo status=ok path={}",
            self.entities_file.display()
        );
        Ok(())
    }
}
