//! Projects/experiments/tasks repository over a [`KvStore`].
//!
//! # Invariants
//! - Experiment lists are returned sorted by `updated_at` descending.
//! - Experiment writes persist the list in that same order, except that a
//!   copy is inserted at index 0.
//! - Deleting a project removes its experiments in the same atomic write.
//! - Stored elements that do not decode are hidden from reads but written
//!   back verbatim, after the decoded records, on every rewrite.

use super::error::RepoResult;
use crate::clock::{Clock, SystemClock};
use crate::model::experiment::{Experiment, ExperimentStatus};
use crate::model::project::Project;
use crate::model::task::Task;
use crate::store::{KvStore, EXPERIMENTS_KEY, PROJECTS_KEY, TASKS_KEY};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Outcome of a cascading project delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectDeletion {
    /// Whether a project with the id existed.
    pub project_removed: bool,
    /// Number of experiments removed with it.
    pub experiments_removed: usize,
}

/// Decoded records of one collection plus the elements that did not decode.
pub(crate) struct Loaded<T> {
    pub(crate) records: Vec<T>,
    pub(crate) undecodable: Vec<Value>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            undecodable: Vec::new(),
        }
    }
}

/// One element of a persisted collection array.
#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum Element<'a, T> {
    Record(&'a T),
    Raw(&'a Value),
}

/// Single source of truth for locally persisted lab notebook data.
pub struct LabRepository<S: KvStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KvStore> LabRepository<S> {
    /// Creates a repository stamping records with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KvStore, C: Clock> LabRepository<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Borrows the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    // ---- projects -------------------------------------------------------

    /// Lists projects in stored (creation) order.
    pub fn list_projects(&self) -> Vec<Project> {
        self.load(PROJECTS_KEY).records
    }

    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.list_projects().into_iter().find(|project| project.id == id)
    }

    /// Appends a new project and returns it.
    pub fn create_project(&self, name: impl Into<String>) -> RepoResult<Project> {
        let mut projects = self.load::<Project>(PROJECTS_KEY);
        let project = Project::new(name, self.now_ms());
        projects.records.push(project.clone());
        self.write_collection(PROJECTS_KEY, &projects)?;

        info!(
            "event=project_create module=repo status=ok project_id={} total={}",
            project.id,
            projects.records.len()
        );
        Ok(project)
    }

    /// Replaces the project with the same id.
    ///
    /// Returns `false` without writing when no such project exists.
    pub fn update_project(&self, project: &Project) -> RepoResult<bool> {
        let mut projects = self.load::<Project>(PROJECTS_KEY);
        let Some(slot) = projects
            .records
            .iter_mut()
            .find(|current| current.id == project.id)
        else {
            debug!(
                "event=project_update module=repo status=skipped reason=not_found project_id={}",
                project.id
            );
            return Ok(false);
        };

        *slot = project.clone();
        self.write_collection(PROJECTS_KEY, &projects)?;
        info!(
            "event=project_update module=repo status=ok project_id={}",
            project.id
        );
        Ok(true)
    }

    /// Deletes a project together with every experiment referencing it.
    pub fn delete_project(&self, id: &str) -> RepoResult<ProjectDeletion> {
        let mut projects = self.load::<Project>(PROJECTS_KEY);
        let projects_before = projects.records.len() + projects.undecodable.len();
        projects.records.retain(|project| project.id != id);
        projects
            .undecodable
            .retain(|value| raw_str(value, "id") != Some(id));

        let mut experiments = self.load_experiments();
        let experiments_before = experiments.records.len() + experiments.undecodable.len();
        experiments
            .records
            .retain(|experiment| experiment.project_id != id);
        experiments
            .undecodable
            .retain(|value| raw_str(value, "projectId") != Some(id));

        let projects_after = projects.records.len() + projects.undecodable.len();
        let experiments_after = experiments.records.len() + experiments.undecodable.len();
        self.store.set_many(&[
            (PROJECTS_KEY, encode(&projects)?),
            (EXPERIMENTS_KEY, encode(&experiments)?),
        ])?;

        let deletion = ProjectDeletion {
            project_removed: projects_after < projects_before,
            experiments_removed: experiments_before - experiments_after,
        };
        info!(
            "event=project_delete module=repo status=ok project_id={} project_removed={} experiments_removed={}",
            id, deletion.project_removed, deletion.experiments_removed
        );
        Ok(deletion)
    }

    // ---- experiments ----------------------------------------------------

    /// Lists experiments, optionally for one project, newest update first.
    ///
    /// Legacy records are upgraded in memory only; storage is not rewritten.
    pub fn list_experiments(&self, project_id: Option<&str>) -> Vec<Experiment> {
        let mut experiments = self.load_experiments().records;
        if let Some(project_id) = project_id {
            experiments.retain(|experiment| experiment.project_id == project_id);
        }
        experiments
    }

    pub fn get_experiment(&self, id: &str) -> Option<Experiment> {
        self.list_experiments(None)
            .into_iter()
            .find(|experiment| experiment.id == id)
    }

    /// All in-progress experiments across projects, newest update first.
    pub fn list_in_progress(&self) -> Vec<Experiment> {
        let mut experiments = self.list_experiments(None);
        experiments.retain(|experiment| experiment.status == ExperimentStatus::InProgress);
        experiments
    }

    /// Case-insensitive title search within [`Self::list_experiments`].
    pub fn search_experiments(&self, project_id: Option<&str>, query: &str) -> Vec<Experiment> {
        let needle = query.trim().to_lowercase();
        let mut experiments = self.list_experiments(project_id);
        if !needle.is_empty() {
            experiments.retain(|experiment| experiment.title.to_lowercase().contains(&needle));
        }
        experiments
    }

    /// Upserts an experiment by id and returns the stored version.
    ///
    /// Updates are stamped with the current time; inserts keep the
    /// caller-supplied `updated_at`.
    pub fn save_experiment(&self, experiment: &Experiment) -> RepoResult<Experiment> {
        let mut experiments = self.load_experiments();
        let stored = match experiments
            .records
            .iter_mut()
            .find(|current| current.id == experiment.id)
        {
            Some(slot) => {
                *slot = Experiment {
                    updated_at: self.now_ms(),
                    ..experiment.clone()
                };
                slot.clone()
            }
            None => {
                experiments.records.push(experiment.clone());
                experiment.clone()
            }
        };

        self.write_collection(EXPERIMENTS_KEY, &experiments)?;
        info!(
            "event=experiment_save module=repo status=ok experiment_id={} project_id={}",
            stored.id, stored.project_id
        );
        Ok(stored)
    }

    /// Creates an in-progress experiment with empty sections.
    pub fn create_experiment(
        &self,
        project_id: impl Into<String>,
        title: impl Into<String>,
    ) -> RepoResult<Experiment> {
        let experiment = Experiment::new(project_id, title, self.now_ms());
        self.save_experiment(&experiment)
    }

    /// Duplicates an experiment and stores the copy at the front of the list.
    ///
    /// Returns `None` when the source does not exist.
    pub fn copy_experiment(&self, source_id: &str) -> RepoResult<Option<Experiment>> {
        let mut experiments = self.load_experiments();
        let Some(source) = experiments
            .records
            .iter()
            .find(|experiment| experiment.id == source_id)
        else {
            debug!(
                "event=experiment_copy module=repo status=skipped reason=not_found experiment_id={source_id}"
            );
            return Ok(None);
        };

        let copy = source.duplicate(self.now_ms());
        experiments.records.insert(0, copy.clone());
        self.write_collection(EXPERIMENTS_KEY, &experiments)?;

        info!(
            "event=experiment_copy module=repo status=ok source_id={} experiment_id={}",
            source_id, copy.id
        );
        Ok(Some(copy))
    }

    /// Deletes one experiment. Returns whether it existed.
    pub fn delete_experiment(&self, id: &str) -> RepoResult<bool> {
        let mut experiments = self.load_experiments();
        let before = experiments.records.len() + experiments.undecodable.len();
        experiments.records.retain(|experiment| experiment.id != id);
        experiments
            .undecodable
            .retain(|value| raw_str(value, "id") != Some(id));
        let after = experiments.records.len() + experiments.undecodable.len();
        self.write_collection(EXPERIMENTS_KEY, &experiments)?;

        let removed = after < before;
        info!("event=experiment_delete module=repo status=ok experiment_id={id} removed={removed}");
        Ok(removed)
    }

    // ---- tasks ----------------------------------------------------------

    /// Reads tasks in stored order. Ordering is the writer's responsibility.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.load(TASKS_KEY).records
    }

    /// Replaces the whole task list.
    ///
    /// Stored tasks that do not decode are kept after `tasks`.
    pub fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        let tasks = Loaded {
            records: tasks.to_vec(),
            undecodable: self.load::<Task>(TASKS_KEY).undecodable,
        };
        self.write_collection(TASKS_KEY, &tasks)?;
        debug!(
            "event=tasks_save module=repo status=ok total={} kept_undecodable={}",
            tasks.records.len(),
            tasks.undecodable.len()
        );
        Ok(())
    }

    // ---- collection plumbing -------------------------------------------

    /// Experiments sorted by `updated_at` descending.
    pub(crate) fn load_experiments(&self) -> Loaded<Experiment> {
        let mut experiments = self.load::<Experiment>(EXPERIMENTS_KEY);
        sort_by_recent_update(&mut experiments.records);
        experiments
    }

    pub(crate) fn load<T: DeserializeOwned>(&self, key: &'static str) -> Loaded<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Loaded::default(),
            Err(err) => {
                warn!(
                    "event=collection_read module=repo status=error key={key} error_code=store_read_failed error={err}"
                );
                return Loaded::default();
            }
        };

        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn!(
                    "event=collection_read module=repo status=error key={key} error_code=corrupt_collection error={err}"
                );
                return Loaded::default();
            }
        };

        let mut loaded = Loaded::default();
        for (index, value) in values.into_iter().enumerate() {
            match T::deserialize(&value) {
                Ok(record) => loaded.records.push(record),
                Err(err) => {
                    warn!(
                        "event=collection_read module=repo status=skipped key={key} index={index} error_code=invalid_record error={err}"
                    );
                    loaded.undecodable.push(value);
                }
            }
        }
        loaded
    }

    fn write_collection<T: Serialize>(
        &self,
        key: &'static str,
        collection: &Loaded<T>,
    ) -> RepoResult<()> {
        self.store.set(key, &encode(collection)?)?;
        Ok(())
    }
}

/// Decoded records first, then undecodable elements unchanged.
pub(crate) fn elements<T>(collection: &Loaded<T>) -> Vec<Element<'_, T>> {
    collection
        .records
        .iter()
        .map(Element::Record)
        .chain(collection.undecodable.iter().map(Element::Raw))
        .collect()
}

fn encode<T: Serialize>(collection: &Loaded<T>) -> RepoResult<String> {
    Ok(serde_json::to_string(&elements(collection))?)
}

fn raw_str<'v>(value: &'v Value, field: &str) -> Option<&'v str> {
    value.get(field).and_then(Value::as_str)
}

fn sort_by_recent_update(experiments: &mut [Experiment]) {
    experiments.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
