//! Manual whole-database sync with a remote repository file.
//!
//! # Responsibility
//! - Persist and validate remote credentials.
//! - Move the full backup document to and from one remote file.
//!
//! # Invariants
//! - Sync is last-writer-wins at whole-database granularity.
//! - No retries and no background work: each call is one user action.

pub mod codec;
pub mod config;
pub mod error;
pub mod github;
pub mod service;

pub use config::SyncConfig;
pub use error::{ConfigError, SyncError, SyncResult};
pub use github::{GitHubContentsClient, PushAck, RemoteFile, RemoteFileStore};
pub use service::{PullOutcome, PushOutcome, SyncService, DEFAULT_COMMIT_MESSAGE};
