//! Daily task list use-cases.
//!
//! # Invariants
//! - Every write re-sorts with [`sort_tasks`] before persisting, so stored
//!   order is always incomplete-first, newest-first.
//! - New tasks are dated on the selected day at the current local time of
//!   day, which keeps same-day insertion order meaningful.

use super::local_day;
use crate::clock::Clock;
use crate::model::task::{sort_tasks, Task};
use crate::repo::{LabRepository, RepoResult};
use crate::store::KvStore;
use chrono::{Local, NaiveDate, TimeZone};
use log::info;

/// Tasks that share one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDay {
    pub day: NaiveDate,
    /// Newest first.
    pub tasks: Vec<Task>,
}

/// Task list facade over the repository.
pub struct TaskService<'r, S: KvStore, C: Clock> {
    repo: &'r LabRepository<S, C>,
}

impl<'r, S: KvStore, C: Clock> TaskService<'r, S, C> {
    pub fn new(repo: &'r LabRepository<S, C>) -> Self {
        Self { repo }
    }

    /// Adds one task per non-empty line of `text`, dated on `day`.
    ///
    /// Returns the created tasks; blank input creates nothing and writes
    /// nothing.
    pub fn add_tasks(&self, text: &str, day: NaiveDate) -> RepoResult<Vec<Task>> {
        let created_at = self.timestamp_on(day);
        let created: Vec<Task> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Task::new(line, created_at))
            .collect();
        if created.is_empty() {
            return Ok(created);
        }

        let mut tasks = created.clone();
        tasks.extend(self.repo.list_tasks());
        sort_tasks(&mut tasks);
        self.repo.save_tasks(&tasks)?;

        info!(
            "event=task_add module=service status=ok added={} day={day}",
            created.len()
        );
        Ok(created)
    }

    /// Flips completion of one task. Returns `None` when the id is unknown.
    pub fn toggle_task(&self, id: &str) -> RepoResult<Option<Task>> {
        let mut tasks = self.repo.list_tasks();
        let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let toggled = task.clone();

        sort_tasks(&mut tasks);
        self.repo.save_tasks(&tasks)?;
        info!(
            "event=task_toggle module=service status=ok task_id={id} completed={}",
            toggled.completed
        );
        Ok(Some(toggled))
    }

    /// Removes one task. Returns whether it existed.
    pub fn delete_task(&self, id: &str) -> RepoResult<bool> {
        let mut tasks = self.repo.list_tasks();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        self.repo.save_tasks(&tasks)?;
        Ok(tasks.len() < before)
    }

    /// Tasks created on `day`, in display order.
    pub fn tasks_for_day(&self, day: NaiveDate) -> Vec<Task> {
        let mut tasks = self.repo.list_tasks();
        tasks.retain(|task| local_day(task.created_at) == Some(day));
        sort_tasks(&mut tasks);
        tasks
    }

    /// Every task grouped by local day, newest day first.
    pub fn timeline(&self) -> Vec<TaskDay> {
        let mut tasks = self.repo.list_tasks();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut days: Vec<TaskDay> = Vec::new();
        for task in tasks {
            let Some(day) = local_day(task.created_at) else {
                continue;
            };
            match days.iter_mut().find(|group| group.day == day) {
                Some(group) => group.tasks.push(task),
                None => days.push(TaskDay {
                    day,
                    tasks: vec![task],
                }),
            }
        }
        days
    }

    /// Number of incomplete tasks.
    pub fn pending_count(&self) -> usize {
        self.repo
            .list_tasks()
            .iter()
            .filter(|task| !task.completed)
            .count()
    }

    fn timestamp_on(&self, day: NaiveDate) -> i64 {
        let now_ms = self.repo.now_ms();
        let Some(now) = Local.timestamp_millis_opt(now_ms).earliest() else {
            return now_ms;
        };
        Local
            .from_local_datetime(&day.and_time(now.time()))
            .earliest()
            .map_or(now_ms, |datetime| datetime.timestamp_millis())
    }
}
