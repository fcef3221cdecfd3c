//! Push/pull orchestration between the repository and a remote file.
//!
//! Push: fetch (for the current revision) -> export -> write with revision.
//! Pull: fetch -> import, replacing all local collections.

use super::config::SyncConfig;
use super::error::{SyncError, SyncResult};
use super::github::RemoteFileStore;
use crate::clock::Clock;
use crate::repo::{ImportSummary, LabRepository};
use crate::store::KvStore;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub const DEFAULT_COMMIT_MESSAGE: &str = "Update data via LabNote Pro";

/// Result of a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No remote file existed; it was created.
    Created { revision: Option<String> },
    /// The remote file was overwritten on top of `previous_revision`.
    Updated {
        previous_revision: String,
        revision: Option<String>,
    },
}

/// Result of a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// Remote file does not exist; local data is untouched.
    NotFound,
    /// Local collections were replaced by the remote document.
    Imported(ImportSummary),
}

/// Runs sync protocols for one repository.
pub struct SyncService<'r, S: KvStore, C: Clock, R: RemoteFileStore> {
    repo: &'r LabRepository<S, C>,
    remote: R,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<'r, S: KvStore, C: Clock, R: RemoteFileStore> SyncService<'r, S, C, R> {
    pub fn new(repo: &'r LabRepository<S, C>, remote: R) -> Self {
        Self {
            repo,
            remote,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a push or pull is currently running.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Uploads the full local database, creating or overwriting the file.
    pub async fn push(&self, config: &SyncConfig) -> SyncResult<PushOutcome> {
        config.validate()?;
        let _guard = self.begin()?;
        let started_at = Instant::now();

        let existing = self.remote.fetch(config).await?;
        let payload = self.repo.export_all().map_err(SyncError::Export)?;
        let previous = existing.map(|file| file.revision);
        let ack = self
            .remote
            .push(config, &payload, previous.as_deref(), DEFAULT_COMMIT_MESSAGE)
            .await?;

        info!(
            "event=sync_push module=sync status=ok created={} duration_ms={}",
            previous.is_none(),
            started_at.elapsed().as_millis()
        );
        Ok(match previous {
            None => PushOutcome::Created {
                revision: ack.revision,
            },
            Some(previous_revision) => PushOutcome::Updated {
                previous_revision,
                revision: ack.revision,
            },
        })
    }

    /// Replaces local data with the remote file, if there is one.
    ///
    /// Destructive: callers confirm with the user first.
    pub async fn pull(&self, config: &SyncConfig) -> SyncResult<PullOutcome> {
        config.validate()?;
        let _guard = self.begin()?;
        let started_at = Instant::now();

        let Some(file) = self.remote.fetch(config).await? else {
            info!("event=sync_pull module=sync status=ok found=false");
            return Ok(PullOutcome::NotFound);
        };
        let summary = self.repo.import_all(&file.content)?;

        info!(
            "event=sync_pull module=sync status=ok found=true projects={} experiments={} tasks={} duration_ms={}",
            summary.projects,
            summary.experiments,
            summary.tasks,
            started_at.elapsed().as_millis()
        );
        Ok(PullOutcome::Imported(summary))
    }

    fn begin(&self) -> SyncResult<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SyncError::Busy)?;
        Ok(InFlightGuard(&self.in_flight))
    }
}
