//! Domain model for tasks, documents and persisted snapshots.
//!
//! # Responsibility
//! - Define the two entity kinds tracked by the app and their wire shape.
//! - Validate required fields at construction, edit and decode time.
//!
//! # Invariants
//! - Every entity carries a non-empty opaque `id` and a non-empty `title`.
//! - `created_at` never changes after construction.
//! - Deletion is a hard removal; there are no tombstones.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document;
pub mod snapshot;
pub mod task;

/// Opaque entity identifier.
///
/// Ids minted by this crate are UUID v4 strings, but ids read back from a
/// cache or sidecar are accepted verbatim.
pub type EntityId = String;

/// Wall-clock timestamp persisted as ISO-8601 text.
pub type Timestamp = DateTime<Utc>;

/// Entity collection discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Document,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Document => "document",
        }
    }

    /// Capitalized label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Document => "Document",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required-field violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle(EntityKind),
    EmptyId(EntityKind),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle(kind) => write!(f, "{} title is required", kind.label()),
            Self::EmptyId(kind) => write!(f, "{kind} id must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Shared accessors used by the entity store.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn created_at(&self) -> Timestamp;
    fn updated_at(&self) -> Timestamp;
}

/// Current time truncated to millisecond precision.
///
/// Matches the resolution of the persisted ISO-8601 strings so a snapshot
/// survives a serialize/deserialize cycle unchanged.
pub fn now_timestamp() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Mints a fresh entity id.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}

/// Trims optional free text; blank input collapses to `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Trims a required title and rejects blank values.
pub(crate) fn require_title(kind: EntityKind, title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle(kind));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional_text, require_title, EntityKind, ValidationError};

    #[test]
    fn optional_text_is_trimmed_and_blank_dropped() {
        assert_eq!(
            normalize_optional_text(Some("  body \n".to_string())).as_deref(),
            Some("body")
        );
        assert_eq!(normalize_optional_text(Some("   ".to_string())), None);
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn require_title_rejects_whitespace() {
        let err = require_title(EntityKind::Document, " \t").unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle(EntityKind::Document));
        assert_eq!(err.to_string(), "Document title is required");
    }
}
