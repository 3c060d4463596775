//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entity storage contract used by services.
//! - Isolate file layout, codec and recovery details from callers.
//!
//! # Invariants
//! - Repository writes must enforce `Entity::validate()` before persistence.
//! - Stored `(list, id)` pairs are unique.

pub mod entity_repo;
pub mod memory_repo;
