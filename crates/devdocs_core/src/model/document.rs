//! Document entity.

use super::{require_title, Entity, EntityId, EntityKind, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Persisted markdown-like document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DocumentRecord")]
pub struct Document {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentDraft {
    pub title: String,
    pub content: String,
}

impl DocumentDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Partial edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Document {
    /// Builds a new document; content is trimmed on creation only.
    pub fn from_draft(
        id: EntityId,
        draft: DocumentDraft,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId(EntityKind::Document));
        }
        let title = require_title(EntityKind::Document, &draft.title)?;
        Ok(Self {
            id,
            title,
            content: draft.content.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges `patch` and stamps `updated_at`.
    ///
    /// A blank replacement title keeps the existing one; the editor pane
    /// never leaves a saved document untitled. Content is stored verbatim.
    pub fn apply_patch(&mut self, patch: DocumentPatch, now: Timestamp) {
        if let Some(title) = patch.title {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                self.title = trimmed.to_string();
            }
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = now;
    }
}

impl Entity for Document {
    const KIND: EntityKind = EntityKind::Document;

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

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    id: EntityId,
    title: String,
    #[serde(default)]
    content: String,
    created_at: Timestamp,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl TryFrom<DocumentRecord> for Document {
    type Error = ValidationError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        if record.id.is_empty() {
            return Err(ValidationError::EmptyId(EntityKind::Document));
        }
        if record.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle(EntityKind::Document));
        }
        Ok(Self {
            id: record.id,
            title: record.title,
            content: record.content,
            created_at: record.created_at,
            updated_at: record.updated_at.unwrap_or(record.created_at),
        })
    }
}
