//! Store configuration.
//!
//! # Invariants
//! - `file_name` is always resolved under `base_dir` through the safe path
//!   resolver before any file access.

use super::recovery::CorruptionPolicy;
use crate::path::safe_path::{ContainmentMode, ContainmentViolation, SafePathResolver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backing file name used when none is configured.
pub const DEFAULT_FILE_NAME: &str = "entities.json";

fn default_file_name() -> PathBuf {
    PathBuf::from(DEFAULT_FILE_NAME)
}

/// Settings for one file-backed entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Trusted root the backing file must live under.
    pub base_dir: PathBuf,
    /// Backing file path relative to `base_dir`.
    #[serde(default = "default_file_name")]
    pub file_name: PathBuf,
    #[serde(default)]
    pub containment: ContainmentMode,
    #[serde(default)]
    pub corruption_policy: CorruptionPolicy,
    /// Write indented JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl StoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            file_name: default_file_name(),
            containment: ContainmentMode::default(),
            corruption_policy: CorruptionPolicy::default(),
            pretty: false,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_containment(mut self, containment: ContainmentMode) -> Self {
        self.containment = containment;
        self
    }

    pub fn with_corruption_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.corruption_policy = policy;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn resolver(&self) -> SafePathResolver {
        SafePathResolver::new(self.base_dir.clone()).with_mode(self.containment)
    }

    /// Absolute location of the backing document.
    ///
    /// # Errors
    /// - Returns `ContainmentViolation` when `file_name` escapes `base_dir`
    ///   and `containment` is `Enforce`.
    pub fn backing_file(&self) -> Result<PathBuf, ContainmentViolation> {
        self.resolver().resolve(&self.file_name)
    }
}
