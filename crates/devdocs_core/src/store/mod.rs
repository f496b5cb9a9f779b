//! In-memory entity store.
//!
//! # Responsibility
//! - Own the task and document collections for one session.
//! - Mint ids/timestamps and enforce required fields on create/edit.
//!
//! # Invariants
//! - Ids are unique within each collection.
//! - Newly created entities are inserted at the head (newest first).
//! - Edits never move `updated_at` backwards and always change it.
//! - The store performs no I/O; persistence belongs to the sync layer.

use crate::model::document::{Document, DocumentDraft, DocumentPatch};
use crate::model::snapshot::Snapshot;
use crate::model::task::{Task, TaskDraft, TaskPatch};
use crate::model::{new_entity_id, now_timestamp, Entity, EntityId, EntityKind, Timestamp};
use crate::model::ValidationError;
use chrono::Duration;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { kind: EntityKind, id: EntityId },
}

impl StoreError {
    /// `NotFound` is recoverable: callers treat it as a no-op.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Authoritative session state for both collections.
#[derive(Debug, Default)]
pub struct EntityStore {
    tasks: Vec<Task>,
    docs: Vec<Document>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        store.replace_all(snapshot);
        store
    }

    /// Creates a task at the head of the collection and returns its id.
    pub fn create_task(&mut self, draft: TaskDraft) -> StoreResult<EntityId> {
        let id = self.fresh_id(EntityKind::Task);
        let task = Task::from_draft(id.clone(), draft, now_timestamp())?;
        self.tasks.insert(0, task);
        Ok(id)
    }

    /// Creates a document at the head of the collection and returns its id.
    pub fn create_document(&mut self, draft: DocumentDraft) -> StoreResult<EntityId> {
        let id = self.fresh_id(EntityKind::Document);
        let document = Document::from_draft(id.clone(), draft, now_timestamp())?;
        self.docs.insert(0, document);
        Ok(id)
    }

    /// Merges a patch into an existing task.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<()> {
        let task = find_mut(&mut self.tasks, id)?;
        let stamp = next_update_stamp(task.updated_at);
        task.apply_patch(patch, stamp)?;
        Ok(())
    }

    /// Merges a patch into an existing document.
    pub fn update_document(&mut self, id: &str, patch: DocumentPatch) -> StoreResult<()> {
        let document = find_mut(&mut self.docs, id)?;
        let stamp = next_update_stamp(document.updated_at);
        document.apply_patch(patch, stamp);
        Ok(())
    }

    /// Removes one entity. Absent ids yield `NotFound` and change nothing.
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> StoreResult<()> {
        match kind {
            EntityKind::Task => remove(&mut self.tasks, id),
            EntityKind::Document => remove(&mut self.docs, id),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|doc| doc.id == id)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Task => self.tasks.len(),
            EntityKind::Document => self.docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.docs.is_empty()
    }

    /// Bulk overwrite of the task collection (load/reconciliation only).
    ///
    /// Later duplicates of an id are dropped to keep ids unique.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = dedup_by_id(tasks);
    }

    /// Bulk overwrite of the document collection (load/reconciliation only).
    pub fn replace_documents(&mut self, docs: Vec<Document>) {
        self.docs = dedup_by_id(docs);
    }

    /// Whole-snapshot overwrite; no per-item merge.
    pub fn replace_all(&mut self, snapshot: Snapshot) {
        self.replace_tasks(snapshot.tasks);
        self.replace_documents(snapshot.docs);
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.docs.clear();
    }

    /// Owned copy of both collections for persistence or export.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.tasks.clone(), self.docs.clone())
    }

    fn fresh_id(&self, kind: EntityKind) -> EntityId {
        loop {
            let id = new_entity_id();
            let taken = match kind {
                EntityKind::Task => self.task(&id).is_some(),
                EntityKind::Document => self.document(&id).is_some(),
            };
            if !taken {
                return id;
            }
        }
    }
}

fn find_mut<'a, T: Entity>(items: &'a mut [T], id: &str) -> StoreResult<&'a mut T> {
    items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
}

fn remove<T: Entity>(items: &mut Vec<T>, id: &str) -> StoreResult<()> {
    let Some(index) = items.iter().position(|item| item.id() == id) else {
        return Err(StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        });
    };
    items.remove(index);
    Ok(())
}

fn dedup_by_id<T: Entity>(items: Vec<T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}

fn next_update_stamp(previous: Timestamp) -> Timestamp {
    let now = now_timestamp();
    if now > previous {
        now
    } else {
        previous
            .checked_add_signed(Duration::milliseconds(1))
            .unwrap_or(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, StoreError};
    use crate::model::document::{DocumentDraft, DocumentPatch};
    use crate::model::task::{TaskDraft, TaskPatch, TaskStatus};
    use crate::model::EntityKind;
    use chrono::{DateTime, Utc};

    #[test]
    fn create_inserts_newest_first() {
        let mut store = EntityStore::new();
        let first = store.create_task(TaskDraft::new("first")).unwrap();
        let second = store.create_task(TaskDraft::new("second")).unwrap();
        let ids: Vec<_> = store.tasks().iter().map(|task| task.id.clone()).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn update_always_advances_updated_at() {
        let mut store = EntityStore::new();
        let id = store.create_task(TaskDraft::new("t")).unwrap();
        let created = store.task(&id).unwrap().created_at;
        store
            .update_task(
                &id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        let task = store.task(&id).unwrap();
        assert!(task.updated_at > created);
        assert_eq!(task.created_at, created);
    }

    #[test]
    fn update_missing_document_is_not_found() {
        let mut store = EntityStore::new();
        let err = store
            .update_document("nope", DocumentPatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "document not found: nope");
    }

    #[test]
    fn create_rejects_blank_title_without_state_change() {
        let mut store = EntityStore::new();
        let err = store
            .create_document(DocumentDraft::new("   ", "body"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.len(EntityKind::Document), 0);
    }

    #[test]
    fn replace_all_drops_duplicate_ids() {
        let mut store = EntityStore::new();
        store.create_task(TaskDraft::new("a")).unwrap();
        let mut snapshot = store.snapshot();
        snapshot.tasks.push(snapshot.tasks[0].clone());

        store.replace_all(snapshot);
        assert_eq!(store.len(EntityKind::Task), 1);
    }

    #[test]
    fn update_at_the_end_of_time_keeps_the_stamp() {
        let mut store = EntityStore::new();
        let id = store.create_task(TaskDraft::new("far future")).unwrap();
        let mut snapshot = store.snapshot();
        snapshot.tasks[0].updated_at = DateTime::<Utc>::MAX_UTC;
        store.replace_all(snapshot);

        store
            .update_task(
                &id,
                TaskPatch {
                    title: Some("still here".to_string()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        let task = store.task(&id).unwrap();
        assert_eq!(task.title, "still here");
        assert_eq!(task.updated_at, DateTime::<Utc>::MAX_UTC);
    }
}
