//! Domain model for entity persistence.
//!
//! # Responsibility
//! - Define the entity record and the persisted document shape.
//! - Keep conflict resolution a pure function independent of storage.
//!
//! # Invariants
//! - Every stored entity is identified by `(list, id)`.
//! - Lists exist independently of entity membership.

pub mod document;
pub mod entity;
pub mod merge;
