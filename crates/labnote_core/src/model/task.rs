//! Daily task record and its display order.

use super::{new_entity_id, EntityId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Dated to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Drives both calendar-day grouping and ordering.
    pub created_at: i64,
}

impl Task {
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: new_entity_id(),
            text: text.into(),
            completed: false,
            created_at,
        }
    }
}

/// Incomplete tasks first, then newest `created_at` first.
pub fn task_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Sorts tasks in place using [`task_order`]. The sort is stable.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(task_order);
}

#[cfg(test)]
mod tests {
    use super::{sort_tasks, Task};

    fn task(id: &str, completed: bool, created_at: i64) -> Task {
        Task {
            id: id.to_string(),
            text: id.to_string(),
            completed,
            created_at,
        }
    }

    #[test]
    fn incomplete_tasks_come_before_completed_ones() {
        let mut tasks = vec![task("done", true, 100), task("open", false, 50)];
        sort_tasks(&mut tasks);
        assert_eq!(tasks[0].id, "open");
        assert_eq!(tasks[1].id, "done");
    }

    #[test]
    fn newer_tasks_lead_within_each_group() {
        let mut tasks = vec![
            task("old-open", false, 10),
            task("old-done", true, 20),
            task("new-open", false, 30),
            task("new-done", true, 40),
        ];
        sort_tasks(&mut tasks);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["new-open", "old-open", "new-done", "old-done"]);
    }
}
