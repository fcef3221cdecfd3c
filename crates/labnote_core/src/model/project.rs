//! Project record.

use super::{new_entity_id, EntityId};
use serde::{Deserialize, Serialize};

/// Top-level grouping of experiments with its own free-text notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub created_at: i64,
    /// Rich-text markup; overwritten wholesale on edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Project {
    /// Creates a project with a generated id and empty notes.
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            created_at,
            notes: Some(String::new()),
        }
    }
}
