//! Two-collection snapshot and its sidecar JSON encoding.
//!
//! Wire shape: `{ "tasks": [...], "docs": [...] }`. Missing keys decode as
//! empty collections.

use super::document::Document;
use super::task::Task;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of both collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub docs: Vec<Document>,
}

impl Snapshot {
    pub fn new(tasks: Vec<Task>, docs: Vec<Document>) -> Self {
        Self { tasks, docs }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.docs.is_empty()
    }

    /// Pretty-printed sidecar form (2-space indent).
    pub fn to_sidecar_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses sidecar text.
    pub fn from_sidecar_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
