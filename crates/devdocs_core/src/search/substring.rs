//! Case-insensitive substring search over the entity store.
//!
//! # Invariants
//! - Blank queries return no hits.
//! - Otherwise the query is matched as typed, surrounding spaces included.
//! - Tasks come before documents; each group keeps store order.

use crate::model::{EntityId, EntityKind};
use crate::store::EntityStore;

/// Default number of hits shown in the quick-search dropdown.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: EntityKind,
    pub id: EntityId,
    pub title: String,
}

/// Searches task title/description and document title/content.
pub fn search_all(store: &EntityStore, query: &str, limit: usize) -> Vec<SearchHit> {
    if query.trim().is_empty() || limit == 0 {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    let tasks = store
        .tasks()
        .iter()
        .filter(|task| {
            matches(&task.title) || task.description.as_deref().is_some_and(matches)
        })
        .map(|task| SearchHit {
            kind: EntityKind::Task,
            id: task.id.clone(),
            title: task.title.clone(),
        });
    let docs = store
        .documents()
        .iter()
        .filter(|doc| matches(&doc.title) || matches(&doc.content))
        .map(|doc| SearchHit {
            kind: EntityKind::Document,
            id: doc.id.clone(),
            title: doc.title.clone(),
        });

    tasks.chain(docs).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::{search_all, DEFAULT_SEARCH_LIMIT};
    use crate::model::document::DocumentDraft;
    use crate::model::task::TaskDraft;
    use crate::model::EntityKind;
    use crate::store::EntityStore;

    #[test]
    fn matches_titles_and_bodies_case_insensitively() {
        let mut store = EntityStore::new();
        let mut draft = TaskDraft::new("Refactor cache");
        draft.description = Some("touches the SIDECAR writer".to_string());
        store.create_task(draft).unwrap();
        store
            .create_document(DocumentDraft::new("Notes", "sidecar format"))
            .unwrap();
        store.create_task(TaskDraft::new("Unrelated")).unwrap();

        let hits = search_all(&store, "Sidecar", DEFAULT_SEARCH_LIMIT);
        let kinds: Vec<_> = hits.iter().map(|hit| hit.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Task, EntityKind::Document]);
        assert_eq!(hits[0].title, "Refactor cache");
    }

    #[test]
    fn blank_query_and_limit_are_respected() {
        let mut store = EntityStore::new();
        for index in 0..15 {
            store.create_task(TaskDraft::new(format!("task {index}"))).unwrap();
        }
        assert!(search_all(&store, "   ", DEFAULT_SEARCH_LIMIT).is_empty());
        assert_eq!(search_all(&store, "task", DEFAULT_SEARCH_LIMIT).len(), 10);
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_query() {
        let mut store = EntityStore::new();
        store.create_task(TaskDraft::new("Fix")).unwrap();
        store.create_task(TaskDraft::new("Fix login")).unwrap();

        let hits = search_all(&store, "fix ", DEFAULT_SEARCH_LIMIT);
        let titles: Vec<_> = hits.iter().map(|hit| hit.title.as_str()).collect();
        assert_eq!(titles, vec!["Fix login"]);
    }
}
