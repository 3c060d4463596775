//! Root-contained path resolution.
//!
//! # Responsibility
//! - Turn a caller-supplied path into an absolute path under a trusted root.
//! - Detect, log and optionally reject paths whose canonical form escapes it.
//!
//! # Invariants
//! - Resolution never panics and has no side effects other than logging.
//! - Containment is decided on canonical forms, component-wise.
//! - In `Audit` mode a violation is reported but the path is still returned.

use log::error;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// How a resolver reacts to a containment violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// Log the violation and return the path anyway.
    #[default]
    Audit,
    /// Log the violation and fail.
    Enforce,
}

/// Every form of a path computed during one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolution {
    pub root: PathBuf,
    pub requested: PathBuf,
    pub absolute: PathBuf,
    pub canonical_absolute: PathBuf,
    pub canonical_root: PathBuf,
}

impl PathResolution {
    pub fn is_contained(&self) -> bool {
        self.canonical_absolute.starts_with(&self.canonical_root)
    }

    /// Returns the violation record when the path escapes the root.
    pub fn violation(&self) -> Option<ContainmentViolation> {
        if self.is_contained() {
            return None;
        }
        Some(ContainmentViolation {
            root: self.root.clone(),
            requested: self.requested.clone(),
            absolute: self.absolute.clone(),
            canonical_absolute: self.canonical_absolute.clone(),
            canonical_root: self.canonical_root.clone(),
        })
    }
}

/// A requested path that resolves outside the trusted root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentViolation {
    pub root: PathBuf,
    pub requested: PathBuf,
    pub absolute: PathBuf,
    pub canonical_absolute: PathBuf,
    pub canonical_root: PathBuf,
}

impl Display for ContainmentViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "path `{}` resolves to `{}`, outside of root `{}`",
            self.requested.display(),
            self.canonical_absolute.display(),
            self.canonical_root.display()
        )
    }
}

impl Error for ContainmentViolation {}

/// Resolver bound to one trusted root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePathResolver {
    root: PathBuf,
    mode: ContainmentMode,
}

impl SafePathResolver {
    /// Creates an auditing resolver for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: ContainmentMode::Audit,
        }
    }

    pub fn with_mode(mut self, mode: ContainmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ContainmentMode {
        self.mode
    }

    /// Resolves `requested` under the root according to the configured mode.
    ///
    /// # Errors
    /// - Returns the violation only in `Enforce` mode.
    pub fn resolve(&self, requested: impl AsRef<Path>) -> Result<PathBuf, ContainmentViolation> {
        match self.mode {
            ContainmentMode::Audit => Ok(resolve_absolute_path(&self.root, requested)),
            ContainmentMode::Enforce => resolve_contained(&self.root, requested),
        }
    }
}

/// Computes all forms of `requested` relative to `root` without judging them.
pub fn inspect(root: impl AsRef<Path>, requested: impl AsRef<Path>) -> PathResolution {
    let root = root.as_ref();
    let requested = requested.as_ref();
    let absolute = join_under_root(root, requested);

    PathResolution {
        root: root.to_path_buf(),
        requested: requested.to_path_buf(),
        canonical_absolute: canonical_form(&absolute),
        canonical_root: canonical_form(root),
        absolute,
    }
}

/// Returns the absolute form of `requested` under `root`, logging escapes.
pub fn resolve_absolute_path(root: impl AsRef<Path>, requested: impl AsRef<Path>) -> PathBuf {
    let resolution = inspect(root, requested);
    if let Some(violation) = resolution.violation() {
        log_violation(&violation, "audit");
    }
    resolution.absolute
}

/// Returns the absolute form of `requested` under `root`.
///
/// # Errors
/// - Returns `ContainmentViolation` when the canonical path escapes `root`.
pub fn resolve_contained(
    root: impl AsRef<Path>,
    requested: impl AsRef<Path>,
) -> Result<PathBuf, ContainmentViolation> {
    let resolution = inspect(root, requested);
    match resolution.violation() {
        Some(violation) => {
            log_violation(&violation, "enforce");
            Err(violation)
        }
        None => Ok(resolution.absolute),
    }
}

fn log_violation(violation: &ContainmentViolation, mode: &str) {
    error!(
        "event=path_containment module=path status=violation mode={} root={} requested={} absolute={} canonical_absolute={} canonical_root={}",
        mode,
        violation.root.display(),
        violation.requested.display(),
        violation.absolute.display(),
        violation.canonical_absolute.display(),
        violation.canonical_root.display()
    );
}

/// Appends `requested` to `root` unless it already begins with `root`.
///
/// A leading root or drive prefix on `requested` never replaces `root`.
fn join_under_root(root: &Path, requested: &Path) -> PathBuf {
    if requested.starts_with(root) && !root.as_os_str().is_empty() {
        return requested.to_path_buf();
    }

    let mut joined = root.to_path_buf();
    for component in requested.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    joined
}

/// Canonicalizes `path` even when its tail does not exist yet.
///
/// Symlinks are resolved for the longest existing ancestor; the remainder is
/// normalized lexically.
fn canonical_form(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    for ancestor in absolute.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        if let Ok(canonical) = std::fs::canonicalize(ancestor) {
            let remainder = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return append_normalized(canonical, remainder);
        }
    }

    append_normalized(PathBuf::new(), &absolute)
}

fn append_normalized(mut base: PathBuf, remainder: &Path) -> PathBuf {
    for component in remainder.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            other => base.push(other.as_os_str()),
        }
    }
    base
}
