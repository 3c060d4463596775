//! Storage collaborators for file-backed repositories.
//!
//! # Responsibility
//! - Abstract byte-level file access and document encoding.
//! - Name the recovery policy applied to undecodable documents.
//! - Carry per-store configuration.
//!
//! # Invariants
//! - Repositories never touch `std::fs` directly; they go through `FileSystem`.
//! - A decode failure is handled only by `CorruptionPolicy`, never by a
//!   blanket catch.

pub mod codec;
pub mod config;
pub mod fs;
pub mod recovery;

pub use codec::{CodecError, DocumentCodec, JsonDocumentCodec};
pub use config::{StoreConfig, DEFAULT_FILE_NAME};
pub use fs::{FileSystem, LocalFileSystem};
pub use recovery::{CorruptionPolicy, RecoveryAction};
