//! Key-value persistence contract used by the repository layer.
//!
//! # Responsibility
//! - Define the minimal string-keyed store the repository is written against.
//! - Name the fixed keys LabNote persists.
//!
//! # Invariants
//! - Values are opaque UTF-8 text; JSON encoding belongs to callers.
//! - `set_many` applies all entries or none.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

/// Storage key for the projects JSON array.
pub const PROJECTS_KEY: &str = "labnote_projects";
/// Storage key for the experiments JSON array.
pub const EXPERIMENTS_KEY: &str = "labnote_experiments";
/// Storage key for the tasks JSON array.
pub const TASKS_KEY: &str = "labnote_tasks";
/// Storage key for the remote-sync configuration object.
pub const SYNC_CONFIG_KEY: &str = "labnote_github_config";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A writer panicked while holding the in-memory map.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "key-value store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value store.
pub trait KvStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Inserts or replaces one value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Inserts or replaces several values atomically.
    fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()>;
    /// Removes one key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        (**self).set_many(entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
