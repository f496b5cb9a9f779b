//! Task entity.
//!
//! # Responsibility
//! - Define the task record and its create/edit inputs.
//! - Keep status/priority wire names stable (`in-progress`, `high`, ...).
//!
//! # Invariants
//! - `title` is trimmed and non-empty.
//! - `updated_at >= created_at`.

use super::{
    normalize_optional_text, require_title, Entity, EntityId, EntityKind, Timestamp,
    ValidationError,
};
use serde::{Deserialize, Serialize};

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub screenshots: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub description: Option<String>,
    pub code: Option<String>,
    pub notes: Option<String>,
    pub screenshots: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial edit; `None` keeps the current value.
///
/// Optional text fields use `Some(String::new())` to clear a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub notes: Option<String>,
    pub screenshots: Option<Vec<String>>,
}

impl Task {
    /// Builds a new task from user input.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTitle` when the trimmed title is blank.
    pub fn from_draft(
        id: EntityId,
        draft: TaskDraft,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId(EntityKind::Task));
        }
        let title = require_title(EntityKind::Task, &draft.title)?;
        Ok(Self {
            id,
            title,
            status: draft.status,
            priority: draft.priority,
            description: normalize_optional_text(draft.description),
            code: normalize_optional_text(draft.code),
            notes: normalize_optional_text(draft.notes),
            screenshots: normalize_screenshots(draft.screenshots),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges `patch` into this task and stamps `updated_at`.
    ///
    /// Validation happens before any field is touched, so a rejected patch
    /// leaves the task unchanged.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: Timestamp) -> Result<(), ValidationError> {
        let title = match patch.title {
            Some(title) => Some(require_title(EntityKind::Task, &title)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if patch.description.is_some() {
            self.description = normalize_optional_text(patch.description);
        }
        if patch.code.is_some() {
            self.code = normalize_optional_text(patch.code);
        }
        if patch.notes.is_some() {
            self.notes = normalize_optional_text(patch.notes);
        }
        if let Some(screenshots) = patch.screenshots {
            self.screenshots = normalize_screenshots(screenshots);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Upper-case `STATUS | PRIORITY` label shown in reports.
    pub fn badge(&self) -> String {
        format!(
            "{} | {}",
            self.status.as_str().to_uppercase(),
            self.priority.as_str().to_uppercase()
        )
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

fn normalize_screenshots(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Lenient decode shape; older snapshots omit defaulted fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: EntityId,
    title: String,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    screenshots: Vec<String>,
    created_at: Timestamp,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        if record.id.is_empty() {
            return Err(ValidationError::EmptyId(EntityKind::Task));
        }
        if record.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle(EntityKind::Task));
        }
        Ok(Self {
            id: record.id,
            title: record.title,
            status: record.status,
            priority: record.priority,
            description: record.description.filter(|value| !value.is_empty()),
            code: record.code.filter(|value| !value.is_empty()),
            notes: record.notes.filter(|value| !value.is_empty()),
            screenshots: record.screenshots,
            created_at: record.created_at,
            updated_at: record.updated_at.unwrap_or(record.created_at),
        })
    }
}
