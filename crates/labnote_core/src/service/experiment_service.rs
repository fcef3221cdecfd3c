//! Experiment edits that need calendar handling.

use super::local_noon_ms;
use crate::clock::Clock;
use crate::model::experiment::Experiment;
use crate::repo::{LabRepository, RepoResult};
use crate::store::KvStore;
use chrono::NaiveDate;
use log::info;

/// Experiment facade over the repository.
pub struct ExperimentService<'r, S: KvStore, C: Clock> {
    repo: &'r LabRepository<S, C>,
}

impl<'r, S: KvStore, C: Clock> ExperimentService<'r, S, C> {
    pub fn new(repo: &'r LabRepository<S, C>) -> Self {
        Self { repo }
    }

    /// Moves the experiment's start to local noon of `day`.
    ///
    /// The start date feeds the exported document's file name and date
    /// range. Returns `None` when the id is unknown.
    pub fn set_start_date(&self, id: &str, day: NaiveDate) -> RepoResult<Option<Experiment>> {
        let Some(mut experiment) = self.repo.get_experiment(id) else {
            return Ok(None);
        };
        experiment.created_at = local_noon_ms(day);
        let stored = self.repo.save_experiment(&experiment)?;

        info!("event=experiment_start_date module=service status=ok experiment_id={id} day={day}");
        Ok(Some(stored))
    }
}
