//! Lab notebook domain model.
//!
//! # Responsibility
//! - Define the records persisted in the three collections.
//! - Own the serialized shape (camelCase JSON) shared by local storage,
//!   backups and the remote sync file.
//!
//! # Invariants
//! - Entity ids are opaque strings, generated client-side and never reused.
//! - Timestamps are Unix epoch milliseconds.

pub mod experiment;
pub mod project;
pub mod task;

use uuid::Uuid;

/// Opaque identifier shared by projects, experiments and tasks.
///
/// Imported data may carry ids of any shape, so this stays a plain string.
pub type EntityId = String;

/// Generates a fresh entity id.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}
