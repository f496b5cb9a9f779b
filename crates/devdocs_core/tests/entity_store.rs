use devdocs_core::model::document::{DocumentDraft, DocumentPatch};
use devdocs_core::model::task::{TaskDraft, TaskPatch, TaskStatus};
use devdocs_core::model::EntityKind;
use devdocs_core::{EntityStore, StoreError, ValidationError};
use std::collections::HashSet;

#[test]
fn ids_stay_unique_across_a_mixed_sequence() {
    let mut store = EntityStore::new();
    let mut created = Vec::new();
    for index in 0..20 {
        created.push(store.create_task(TaskDraft::new(format!("task {index}"))).unwrap());
        created.push(
            store
                .create_document(DocumentDraft::new(format!("doc {index}"), "body"))
                .unwrap(),
        );
    }
    for id in created.iter().step_by(3) {
        let _ = store.delete(EntityKind::Task, id);
        let _ = store.delete(EntityKind::Document, id);
    }

    let task_ids: HashSet<_> = store.tasks().iter().map(|task| task.id.clone()).collect();
    let doc_ids: HashSet<_> = store.documents().iter().map(|doc| doc.id.clone()).collect();
    assert_eq!(task_ids.len(), store.len(EntityKind::Task));
    assert_eq!(doc_ids.len(), store.len(EntityKind::Document));
}

#[test]
fn newest_first_and_update_keeps_position() {
    let mut store = EntityStore::new();
    let first = store.create_task(TaskDraft::new("first")).unwrap();
    let second = store.create_task(TaskDraft::new("second")).unwrap();
    assert_eq!(store.tasks()[0].id, second);

    store
        .update_task(
            &first,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert_eq!(store.tasks()[1].id, first);
    let task = store.task(&first).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task.updated_at > task.created_at);
}

#[test]
fn blank_task_title_is_rejected_and_store_unchanged() {
    let mut store = EntityStore::new();
    let err = store.create_task(TaskDraft::new("   ")).unwrap_err();

    assert_eq!(
        err,
        StoreError::Validation(ValidationError::EmptyTitle(EntityKind::Task))
    );
    assert_eq!(err.to_string(), "Task title is required");
    assert!(store.is_empty());
}

#[test]
fn deleting_twice_reports_not_found_the_second_time() {
    let mut store = EntityStore::new();
    let id = store
        .create_document(DocumentDraft::new("Notes", "hello"))
        .unwrap();

    store.delete(EntityKind::Document, &id).unwrap();
    let err = store.delete(EntityKind::Document, &id).unwrap_err();

    assert!(err.is_not_found());
    assert!(store.documents().is_empty());
}

#[test]
fn document_edit_with_blank_title_keeps_previous_title() {
    let mut store = EntityStore::new();
    let id = store
        .create_document(DocumentDraft::new("Runbook", "step one"))
        .unwrap();

    store
        .update_document(
            &id,
            DocumentPatch {
                title: Some("  ".to_string()),
                content: Some("step two".to_string()),
            },
        )
        .unwrap();

    let doc = store.document(&id).unwrap();
    assert_eq!(doc.title, "Runbook");
    assert_eq!(doc.content, "step two");
}

#[test]
fn snapshot_roundtrip_restores_same_collections() {
    let mut store = EntityStore::new();
    store.create_task(TaskDraft::new("a")).unwrap();
    store
        .create_document(DocumentDraft::new("b", "content"))
        .unwrap();

    let restored = EntityStore::from_snapshot(store.snapshot());

    assert_eq!(restored.tasks(), store.tasks());
    assert_eq!(restored.documents(), store.documents());
}
