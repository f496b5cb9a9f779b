//! Core of the DevDocs task and document tracker.
//!
//! The crate keeps one session's tasks and documents in memory, mirrors them
//! to a profile cache and an optional user-granted folder, and exports a
//! paginated PDF report.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod overview;
pub mod report;
pub mod repo;
pub mod search;
pub mod store;
pub mod sync;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::document::{Document, DocumentDraft, DocumentPatch};
pub use model::snapshot::Snapshot;
pub use model::task::{Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus};
pub use model::{EntityId, EntityKind, Timestamp, ValidationError};
pub use repo::cache_repo::{CacheRepository, SqliteCacheRepository};
pub use search::substring::{search_all, SearchHit, DEFAULT_SEARCH_LIMIT};
pub use store::{EntityStore, StoreError, StoreResult};
pub use sync::coordinator::{FolderSyncOutcome, ReportDelivery, SyncCoordinator};
pub use sync::folder::DirectoryPick;
pub use sync::notify::{Notification, NotificationLevel, Notifier};
pub use sync::PersistenceFault;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
