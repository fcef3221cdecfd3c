//! Core logic for LabNote, a personal lab notebook.
//!
//! Projects hold experiments with four rich-text sections; a daily task list
//! sits alongside. Everything persists in a key-value store, and the whole
//! database can be mirrored to one file in a remote repository.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;

pub use clock::{Clock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::experiment::{Experiment, ExperimentSection, ExperimentStatus};
pub use model::project::Project;
pub use model::task::{sort_tasks, Task};
pub use model::EntityId;
pub use repo::{
    BackupDocument, ImportError, ImportSummary, LabRepository, ProjectDeletion, RepoError,
    RepoResult, BACKUP_FORMAT_VERSION,
};
pub use service::document::{export_experiment_document, ExperimentDocument};
pub use service::experiment_service::ExperimentService;
pub use service::task_service::{TaskDay, TaskService};
pub use store::{KvStore, MemoryKvStore, SqliteKvStore, StoreError};
pub use sync::{
    ConfigError, GitHubContentsClient, PullOutcome, PushOutcome, RemoteFileStore, SyncConfig,
    SyncError, SyncService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
