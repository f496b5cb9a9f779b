//! Snapshot cache over a key/value repository.
//!
//! # Responsibility
//! - Store each collection as a JSON array under its own fixed key.
//! - Load leniently: a missing or corrupt key yields an empty collection.
//!
//! # Invariants
//! - `save` always writes both keys; last write wins.
//! - `load` never fails and never repairs corrupt entries.

use super::PersistenceFault;
use crate::model::snapshot::Snapshot;
use crate::repo::cache_repo::CacheRepository;
use log::{debug, warn};
use serde::de::DeserializeOwned;

pub type CacheResult<T> = Result<T, PersistenceFault>;

/// Profile-scoped synchronous snapshot cache.
pub struct CacheAdapter<R: CacheRepository> {
    repo: R,
    tasks_key: String,
    docs_key: String,
}

impl<R: CacheRepository> CacheAdapter<R> {
    pub fn new(repo: R, tasks_key: impl Into<String>, docs_key: impl Into<String>) -> Self {
        Self {
            repo,
            tasks_key: tasks_key.into(),
            docs_key: docs_key.into(),
        }
    }

    /// Writes both collections.
    pub fn save(&self, snapshot: &Snapshot) -> CacheResult<()> {
        let tasks = serde_json::to_string(&snapshot.tasks)?;
        let docs = serde_json::to_string(&snapshot.docs)?;
        self.repo.put_entry(&self.tasks_key, &tasks)?;
        self.repo.put_entry(&self.docs_key, &docs)?;
        debug!(
            "event=cache_save module=sync status=ok tasks={} docs={}",
            snapshot.tasks.len(),
            snapshot.docs.len()
        );
        Ok(())
    }

    /// Reads both collections; faults degrade to empty collections.
    pub fn load(&self) -> Snapshot {
        Snapshot::new(
            self.load_key(&self.tasks_key),
            self.load_key(&self.docs_key),
        )
    }

    /// Removes both keys.
    pub fn clear(&self) -> CacheResult<()> {
        self.repo.remove_entry(&self.tasks_key)?;
        self.repo.remove_entry(&self.docs_key)?;
        Ok(())
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn load_key<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.repo.get_entry(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("event=cache_load module=sync status=error key={key} error={err}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Option<Vec<T>>>(&raw) {
            Ok(items) => items.unwrap_or_default(),
            Err(err) => {
                warn!("event=cache_load module=sync status=corrupt key={key} error={err}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CacheAdapter;
    use crate::db::open_db_in_memory;
    use crate::model::task::TaskDraft;
    use crate::repo::cache_repo::{CacheRepository, SqliteCacheRepository};
    use crate::store::EntityStore;

    fn adapter() -> CacheAdapter<SqliteCacheRepository> {
        let repo = SqliteCacheRepository::new(open_db_in_memory().unwrap());
        CacheAdapter::new(repo, "tasks", "docs")
    }

    #[test]
    fn save_then_load_roundtrips() {
        let cache = adapter();
        let mut store = EntityStore::new();
        store.create_task(TaskDraft::new("cached")).unwrap();

        cache.save(&store.snapshot()).unwrap();
        assert_eq!(cache.load(), store.snapshot());
    }

    #[test]
    fn corrupt_key_only_empties_its_own_collection() {
        let cache = adapter();
        let mut store = EntityStore::new();
        store.create_task(TaskDraft::new("kept")).unwrap();
        cache.save(&store.snapshot()).unwrap();
        cache.repository().put_entry("docs", "{not json").unwrap();

        let loaded = cache.load();
        assert_eq!(loaded.tasks.len(), 1);
        assert!(loaded.docs.is_empty());
        assert_eq!(
            cache.repository().get_entry("docs").unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn null_entry_loads_as_empty() {
        let cache = adapter();
        cache.repository().put_entry("tasks", "null").unwrap();
        assert!(cache.load().tasks.is_empty());
    }
}
