//! Full-database export/import.
//!
//! The backup document is also the payload of remote sync:
//! `{version, timestamp, projects, experiments, tasks}`, pretty-printed.

use super::error::{ImportError, RepoError, RepoResult};
use super::lab_repo::{elements, Element, LabRepository};
use crate::clock::Clock;
use crate::model::experiment::Experiment;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::store::{KvStore, EXPERIMENTS_KEY, PROJECTS_KEY, TASKS_KEY};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope version written by [`LabRepository::export_all`].
pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Serialized full-database snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    /// Export time, epoch milliseconds.
    pub timestamp: i64,
    pub projects: Vec<Project>,
    pub experiments: Vec<Experiment>,
    pub tasks: Vec<Task>,
}

/// Wire form of [`BackupDocument`] that also carries stored elements the
/// typed model cannot read.
#[derive(Serialize)]
struct ExportEnvelope<'a> {
    version: u32,
    timestamp: i64,
    projects: Vec<Element<'a, Project>>,
    experiments: Vec<Element<'a, Experiment>>,
    tasks: Vec<Element<'a, Task>>,
}

/// Element counts applied by a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub projects: usize,
    pub experiments: usize,
    pub tasks: usize,
}

impl<S: KvStore, C: Clock> LabRepository<S, C> {
    /// Builds the typed snapshot document from current storage.
    ///
    /// Stored elements that do not decode are left out; [`Self::export_all`]
    /// keeps them.
    pub fn snapshot(&self) -> BackupDocument {
        BackupDocument {
            version: BACKUP_FORMAT_VERSION,
            timestamp: self.now_ms(),
            projects: self.list_projects(),
            experiments: self.list_experiments(None),
            tasks: self.list_tasks(),
        }
    }

    /// Serializes every collection into one pretty-printed JSON document.
    pub fn export_all(&self) -> RepoResult<String> {
        let projects = self.load::<Project>(PROJECTS_KEY);
        let experiments = self.load_experiments();
        let tasks = self.load::<Task>(TASKS_KEY);
        let envelope = ExportEnvelope {
            version: BACKUP_FORMAT_VERSION,
            timestamp: self.now_ms(),
            projects: elements(&projects),
            experiments: elements(&experiments),
            tasks: elements(&tasks),
        };
        let text = serde_json::to_string_pretty(&envelope)?;
        info!(
            "event=backup_export module=repo status=ok projects={} experiments={} tasks={} bytes={}",
            envelope.projects.len(),
            envelope.experiments.len(),
            envelope.tasks.len(),
            text.len()
        );
        Ok(text)
    }

    /// Replaces all three collections with the arrays of a backup.
    ///
    /// Fails closed, writing nothing, when the text is not JSON or when
    /// `projects` or `experiments` is missing or not an array. Arrays are
    /// stored as given; elements the model cannot read are skipped by later
    /// reads and kept by later writes. A `tasks` entry that is not an array
    /// imports as empty.
    pub fn import_all(&self, json_text: &str) -> Result<ImportSummary, ImportError> {
        let result = self.try_import(json_text);
        match &result {
            Ok(summary) => info!(
                "event=backup_import module=repo status=ok projects={} experiments={} tasks={}",
                summary.projects, summary.experiments, summary.tasks
            ),
            Err(err) => warn!("event=backup_import module=repo status=error error={err}"),
        }
        result
    }

    fn try_import(&self, json_text: &str) -> Result<ImportSummary, ImportError> {
        let document: Value = serde_json::from_str(json_text)
            .map_err(|err| ImportError::InvalidJson(err.to_string()))?;

        let projects = required_array(&document, "projects")?;
        let experiments = required_array(&document, "experiments")?;
        let tasks: &[Value] = match document.get("tasks") {
            Some(Value::Array(items)) => items.as_slice(),
            None | Some(Value::Null) => &[],
            Some(_) => {
                warn!(
                    "event=backup_import module=repo status=skipped collection=tasks reason=not_array"
                );
                &[]
            }
        };

        self.store()
            .set_many(&[
                (PROJECTS_KEY, encode_raw(projects)?),
                (EXPERIMENTS_KEY, encode_raw(experiments)?),
                (TASKS_KEY, encode_raw(tasks)?),
            ])
            .map_err(|err| ImportError::Repo(err.into()))?;

        Ok(ImportSummary {
            projects: projects.len(),
            experiments: experiments.len(),
            tasks: tasks.len(),
        })
    }
}

fn required_array<'d>(
    document: &'d Value,
    collection: &'static str,
) -> Result<&'d [Value], ImportError> {
    match document.get(collection) {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        _ => Err(ImportError::MissingCollection(collection)),
    }
}

fn encode_raw(items: &[Value]) -> Result<String, ImportError> {
    serde_json::to_string(items).map_err(|err| RepoError::from(err).into())
}
