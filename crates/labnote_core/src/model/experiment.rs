//! Experiment record, its status and section helpers.
//!
//! # Invariants
//! - Deserialization always yields all four content sections; records written
//!   before sections existed are upgraded in memory (see [`ExperimentRecord`]).
//! - Serialization never emits the legacy `content` field.

use super::{new_entity_id, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Lifecycle state shown on experiment cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentStatus {
    #[default]
    InProgress,
    Completed,
    Paused,
}

impl ExperimentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Paused => "PAUSED",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
        }
    }
}

impl Display for ExperimentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "PAUSED" => Ok(Self::Paused),
            other => Err(format!(
                "unknown experiment status `{other}`; expected IN_PROGRESS|COMPLETED|PAUSED"
            )),
        }
    }
}

/// One of the four independently editable rich-text sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentSection {
    Purpose,
    Methods,
    Results,
    Conclusion,
}

impl ExperimentSection {
    pub const ALL: [Self; 4] = [Self::Purpose, Self::Methods, Self::Results, Self::Conclusion];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purpose => "purpose",
            Self::Methods => "methods",
            Self::Results => "results",
            Self::Conclusion => "conclusion",
        }
    }
}

impl FromStr for ExperimentSection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "purpose" => Ok(Self::Purpose),
            "methods" => Ok(Self::Methods),
            "results" => Ok(Self::Results),
            "conclusion" => Ok(Self::Conclusion),
            other => Err(format!(
                "unknown section `{other}`; expected purpose|methods|results|conclusion"
            )),
        }
    }
}

/// Experiment with four rich-text sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ExperimentRecord")]
pub struct Experiment {
    pub id: EntityId,
    /// References a project by id; only cascade delete ties them together.
    pub project_id: EntityId,
    pub title: String,
    pub status: ExperimentStatus,
    pub created_at: i64,
    /// Restamped on every update through the repository.
    pub updated_at: i64,
    pub purpose: String,
    pub methods: String,
    pub results: String,
    pub conclusion: String,
}

impl Experiment {
    /// Creates an in-progress experiment with empty sections.
    pub fn new(project_id: impl Into<EntityId>, title: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: new_entity_id(),
            project_id: project_id.into(),
            title: title.into(),
            status: ExperimentStatus::InProgress,
            created_at: now_ms,
            updated_at: now_ms,
            purpose: String::new(),
            methods: String::new(),
            results: String::new(),
            conclusion: String::new(),
        }
    }

    /// Duplicates every content field under a new id, suffixing the title.
    pub fn duplicate(&self, now_ms: i64) -> Self {
        Self {
            id: new_entity_id(),
            title: format!("{} (Copy)", self.title),
            created_at: now_ms,
            updated_at: now_ms,
            ..self.clone()
        }
    }

    pub fn section(&self, section: ExperimentSection) -> &str {
        match section {
            ExperimentSection::Purpose => &self.purpose,
            ExperimentSection::Methods => &self.methods,
            ExperimentSection::Results => &self.results,
            ExperimentSection::Conclusion => &self.conclusion,
        }
    }

    pub fn set_section(&mut self, section: ExperimentSection, markup: impl Into<String>) {
        let slot = match section {
            ExperimentSection::Purpose => &mut self.purpose,
            ExperimentSection::Methods => &mut self.methods,
            ExperimentSection::Results => &mut self.results,
            ExperimentSection::Conclusion => &mut self.conclusion,
        };
        *slot = markup.into();
    }
}

/// Tolerant on-disk shape of an experiment.
///
/// Older records carried one `content` blob instead of sections. Missing or
/// empty `purpose` falls back to `content`; other missing sections become
/// empty strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentRecord {
    id: EntityId,
    project_id: EntityId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: ExperimentStatus,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    updated_at: i64,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    methods: Option<String>,
    #[serde(default)]
    results: Option<String>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<ExperimentRecord> for Experiment {
    fn from(record: ExperimentRecord) -> Self {
        let purpose = match record.purpose.filter(|value| !value.is_empty()) {
            Some(purpose) => purpose,
            None => record.content.unwrap_or_default(),
        };

        Self {
            id: record.id,
            project_id: record.project_id,
            title: record.title,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            purpose,
            methods: record.methods.unwrap_or_default(),
            results: record.results.unwrap_or_default(),
            conclusion: record.conclusion.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Experiment, ExperimentSection, ExperimentStatus};
    use serde_json::json;

    #[test]
    fn legacy_content_fills_purpose() {
        let legacy = json!({
            "id": "e1",
            "projectId": "p1",
            "title": "old",
            "status": "COMPLETED",
            "createdAt": 1,
            "updatedAt": 2,
            "content": "<p>legacy</p>"
        });

        let experiment: Experiment = serde_json::from_value(legacy).unwrap();
        assert_eq!(experiment.purpose, "<p>legacy</p>");
        assert_eq!(experiment.methods, "");
        assert_eq!(experiment.results, "");
        assert_eq!(experiment.conclusion, "");
        assert_eq!(experiment.status, ExperimentStatus::Completed);
    }

    #[test]
    fn serialized_shape_is_camel_case_without_legacy_content() {
        let experiment = Experiment::new("p1", "titration", 42);
        let value = serde_json::to_value(&experiment).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert_eq!(value["status"], "IN_PROGRESS");
        assert_eq!(value["updatedAt"], 42);
        assert!(value.get("content").is_none());
    }

    #[test]
    fn duplicate_keeps_sections_and_suffixes_title() {
        let mut source = Experiment::new("p1", "PCR", 10);
        source.set_section(ExperimentSection::Results, "<b>band at 500bp</b>");
        source.status = ExperimentStatus::Paused;

        let copy = source.duplicate(99);
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.title, "PCR (Copy)");
        assert_eq!(copy.results, "<b>band at 500bp</b>");
        assert_eq!(copy.status, ExperimentStatus::Paused);
        assert_eq!((copy.created_at, copy.updated_at), (99, 99));
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!(
            "in-progress".parse::<ExperimentStatus>().unwrap(),
            ExperimentStatus::InProgress
        );
        assert!("archived".parse::<ExperimentStatus>().is_err());
    }
}
