//! Local repository over the key-value store.
//!
//! # Responsibility
//! - Provide synchronous CRUD over the projects, experiments and tasks
//!   collections, each persisted as one JSON array under a fixed key.
//! - Produce and consume the full-database backup document.
//!
//! # Invariants
//! - Every write persists the entire collection array.
//! - Reads are lenient: absent, unreadable or corrupt collections read as
//!   empty, and undecodable records are skipped with a warning.
//! - Imports are strict and all-or-nothing.

mod backup;
mod error;
mod lab_repo;

pub use backup::{BackupDocument, ImportSummary, BACKUP_FORMAT_VERSION};
pub use error::{ImportError, RepoError, RepoResult};
pub use lab_repo::{LabRepository, ProjectDeletion};
