//! Sync coordinator: the session's application state.
//!
//! # Responsibility
//! - Own the entity store, cache, folder adapter and notifier for one
//!   session (created by [`SyncCoordinator::open`], torn down by
//!   [`SyncCoordinator::shutdown`]).
//! - Persist every successful mutation: cache first (synchronous), then a
//!   detached sidecar write when a folder is connected.
//! - Reconcile on folder connect and run clear-all and report export.
//!
//! # Invariants
//! - Cache write precedes the folder write for the same mutation.
//! - Sidecar writes are neither queued nor coalesced; when two overlap, the
//!   one that lands last defines the file.
//! - Reconciliation replaces the whole snapshot; items are never merged.
//! - A sidecar without any items never overwrites the in-memory snapshot.
//! - A sidecar that exists but cannot be read or parsed is never overwritten
//!   by reconciliation.
//! - No persistence fault propagates to callers.

use super::cache::CacheAdapter;
use super::folder::{DirectoryPick, FileRead, FolderAdapter, FolderConnectError, FolderHandle};
use super::notify::Notifier;
use crate::config::CoreConfig;
use crate::model::document::{DocumentDraft, DocumentPatch};
use crate::model::snapshot::Snapshot;
use crate::model::task::{TaskDraft, TaskPatch};
use crate::model::{EntityId, EntityKind, Timestamp};
use crate::report::layout::ReportOptions;
use crate::report::build_report;
use crate::repo::cache_repo::CacheRepository;
use crate::store::{EntityStore, StoreError, StoreResult};
use log::{debug, error, info, warn};
use std::path::Path;
use tokio::task::JoinHandle;

/// Result of a folder connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderSyncOutcome {
    /// User dismissed the picker; nothing reported.
    Cancelled,
    /// Host lacks directory access; reported.
    Unsupported,
    /// Grant was unusable; reported.
    Failed,
    /// A valid sidecar replaced the in-memory snapshot.
    LoadedFromFolder,
    /// No sidecar existed, or it held no items; the current snapshot was
    /// written out.
    Bootstrapped,
    /// The sidecar could not be read or did not parse; in-memory state and
    /// the file are both kept.
    KeptLocal,
}

/// Where an exported report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDelivery {
    SavedToFolder { file_name: String },
    /// No folder connected; the host offers the bytes as a download.
    Download { file_name: String, bytes: Vec<u8> },
    Failed { file_name: String },
}

/// Session state plus the persistence protocol around it.
pub struct SyncCoordinator<R: CacheRepository> {
    config: CoreConfig,
    store: EntityStore,
    cache: CacheAdapter<R>,
    folder: FolderAdapter,
    notifier: Notifier,
    pending_writes: Vec<JoinHandle<()>>,
}

impl<R: CacheRepository> SyncCoordinator<R> {
    /// Starts a session: loads whatever the cache holds into a fresh store.
    pub fn open(config: CoreConfig, repo: R, notifier: Notifier) -> Self {
        let cache = CacheAdapter::new(
            repo,
            config.tasks_cache_key.clone(),
            config.docs_cache_key.clone(),
        );
        let store = EntityStore::from_snapshot(cache.load());
        info!(
            "event=session_start module=sync status=ok tasks={} docs={}",
            store.len(EntityKind::Task),
            store.len(EntityKind::Document)
        );
        Self {
            config,
            store,
            cache,
            folder: FolderAdapter::new(),
            notifier,
            pending_writes: Vec::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheAdapter<R> {
        &self.cache
    }

    pub fn is_folder_connected(&self) -> bool {
        self.folder.is_connected()
    }

    pub fn folder_root(&self) -> Option<&Path> {
        self.folder.handle().map(FolderHandle::root)
    }

    pub fn create_task(&mut self, draft: TaskDraft) -> StoreResult<EntityId> {
        let result = self.store.create_task(draft);
        self.after_create(EntityKind::Task, result)
    }

    pub fn create_document(&mut self, draft: DocumentDraft) -> StoreResult<EntityId> {
        let result = self.store.create_document(draft);
        self.after_create(EntityKind::Document, result)
    }

    /// Edits a task. Returns `Ok(false)` when the id is unknown (no-op).
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<bool> {
        let result = self.store.update_task(id, patch);
        self.after_update(EntityKind::Task, id, result, "Task updated")
    }

    /// Edits a document. Returns `Ok(false)` when the id is unknown (no-op).
    pub fn update_document(&mut self, id: &str, patch: DocumentPatch) -> StoreResult<bool> {
        let result = self.store.update_document(id, patch);
        self.after_update(EntityKind::Document, id, result, "Document saved")
    }

    /// Deletes one entity. Unknown ids are a silent no-op returning `false`.
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> bool {
        match self.store.delete(kind, id) {
            Ok(()) => {
                self.persist();
                self.notifier.success(format!("{} deleted", kind.label()));
                true
            }
            Err(err) => {
                debug!("event=entity_delete module=sync status=noop kind={kind} error={err}");
                false
            }
        }
    }

    /// Connects the granted folder and reconciles with its sidecar.
    pub async fn connect_folder(&mut self, pick: DirectoryPick) -> FolderSyncOutcome {
        let handle = match self.folder.connect(pick).await {
            Ok(handle) => handle.clone(),
            Err(err) if err.is_user_cancelled() => {
                debug!("event=folder_connect module=sync status=cancelled");
                return FolderSyncOutcome::Cancelled;
            }
            Err(FolderConnectError::Unsupported) => {
                warn!("event=folder_connect module=sync status=unsupported");
                self.notifier
                    .error("Your environment does not support directory access");
                return FolderSyncOutcome::Unsupported;
            }
            Err(err) => {
                error!("event=folder_connect module=sync status=error error={err}");
                self.notifier.error("Failed to connect folder");
                return FolderSyncOutcome::Failed;
            }
        };
        self.notifier.success("Folder connected");

        let raw = match handle.read_file(&self.config.sidecar_file_name).await {
            FileRead::Text(raw) if !raw.trim().is_empty() => raw,
            FileRead::Unreadable => {
                warn!("event=folder_reconcile module=sync status=unreadable source=memory");
                return FolderSyncOutcome::KeptLocal;
            }
            FileRead::Absent | FileRead::Text(_) => return self.bootstrap_folder(&handle).await,
        };

        match Snapshot::from_sidecar_json(&raw) {
            Ok(snapshot) if snapshot.is_empty() => self.bootstrap_folder(&handle).await,
            Ok(snapshot) => {
                self.store.replace_all(snapshot);
                self.save_cache();
                info!(
                    "event=folder_reconcile module=sync status=ok source=folder tasks={} docs={}",
                    self.store.len(EntityKind::Task),
                    self.store.len(EntityKind::Document)
                );
                self.notifier.info("Data loaded from folder");
                FolderSyncOutcome::LoadedFromFolder
            }
            Err(err) => {
                warn!("event=folder_reconcile module=sync status=corrupt error={err}");
                FolderSyncOutcome::KeptLocal
            }
        }
    }

    /// Forgets the folder grant for the rest of the session.
    pub fn disconnect_folder(&mut self) {
        self.folder.disconnect();
    }

    /// Empties both collections, the cache and (if connected) the sidecar.
    ///
    /// Waits for in-flight sidecar writes first so none of them can land
    /// after the empty snapshot.
    pub async fn clear_all(&mut self) {
        self.flush().await;
        self.store.clear();
        if let Err(err) = self.cache.clear() {
            error!("event=clear_all module=sync status=error target=cache error={err}");
            self.notifier.error("Failed to clear local cache");
        }

        if let Some(handle) = self.folder.handle() {
            let written = match serde_json::to_string(&Snapshot::default()) {
                Ok(empty) => handle
                    .write_file(&self.config.sidecar_file_name, &empty)
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };
            if let Err(err) = written {
                warn!("event=clear_all module=sync status=error target=folder error={err}");
                self.notifier.error("Failed to clear folder data");
            }
        }

        info!("event=clear_all module=sync status=ok");
        self.notifier.success("All data cleared");
    }

    /// Builds the report and delivers it to the folder or as a download.
    pub async fn export_report(&self, generated_at: Timestamp) -> ReportDelivery {
        let options = ReportOptions::new(self.config.report_title.clone());
        let artifact = build_report(
            &self.store.snapshot(),
            &options,
            &self.config.report_file_stem,
            generated_at,
        );
        info!(
            "event=report_build module=report status=ok pages={} bytes={}",
            artifact.document.page_count(),
            artifact.bytes.len()
        );

        let Some(handle) = self.folder.handle() else {
            self.notifier
                .info("PDF downloaded (connect a folder for auto-save)");
            return ReportDelivery::Download {
                file_name: artifact.file_name,
                bytes: artifact.bytes,
            };
        };

        match handle
            .write_binary(&artifact.file_name, &artifact.bytes)
            .await
        {
            Ok(()) => {
                self.notifier.success("PDF saved");
                ReportDelivery::SavedToFolder {
                    file_name: artifact.file_name,
                }
            }
            Err(err) => {
                error!("event=report_save module=report status=error error={err}");
                self.notifier.error("Failed to save PDF to folder");
                ReportDelivery::Failed {
                    file_name: artifact.file_name,
                }
            }
        }
    }

    /// Awaits every sidecar write issued so far.
    pub async fn flush(&mut self) {
        for task in std::mem::take(&mut self.pending_writes) {
            if let Err(err) = task.await {
                warn!("event=sidecar_write module=sync status=aborted error={err}");
            }
        }
    }

    /// Ends the session: drains pending writes and drops the folder grant.
    pub async fn shutdown(mut self) {
        self.flush().await;
        self.folder.disconnect();
        info!("event=session_end module=sync status=ok");
    }

    fn after_create(
        &mut self,
        kind: EntityKind,
        result: StoreResult<EntityId>,
    ) -> StoreResult<EntityId> {
        match result {
            Ok(id) => {
                self.persist();
                self.notifier.success(format!("{} created", kind.label()));
                Ok(id)
            }
            Err(err) => {
                self.report_rejection(&err);
                Err(err)
            }
        }
    }

    fn after_update(
        &mut self,
        kind: EntityKind,
        id: &str,
        result: StoreResult<()>,
        message: &str,
    ) -> StoreResult<bool> {
        match result {
            Ok(()) => {
                self.persist();
                self.notifier.success(message);
                Ok(true)
            }
            Err(err) if err.is_not_found() => {
                debug!("event=entity_update module=sync status=noop kind={kind} id={id}");
                Ok(false)
            }
            Err(err) => {
                self.report_rejection(&err);
                Err(err)
            }
        }
    }

    fn report_rejection(&self, err: &StoreError) {
        debug!("event=entity_write module=sync status=rejected error={err}");
        self.notifier.warning(err.to_string());
    }

    fn save_cache(&self) {
        if let Err(err) = self.cache.save(&self.store.snapshot()) {
            error!("event=cache_save module=sync status=error error={err}");
            self.notifier.error("Failed to save to local cache");
        }
    }

    fn persist(&mut self) {
        self.save_cache();
        if let Some(handle) = self.folder.handle().cloned() {
            self.spawn_sidecar_write(handle);
        }
    }

    fn spawn_sidecar_write(&mut self, handle: FolderHandle) {
        let payload = match self.store.snapshot().to_sidecar_json() {
            Ok(payload) => payload,
            Err(err) => {
                error!("event=sidecar_write module=sync status=error error={err}");
                self.notifier.error("Failed to write data to folder");
                return;
            }
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("event=sidecar_write module=sync status=skipped reason=no_runtime");
            self.notifier.error("Failed to write data to folder");
            return;
        };

        let name = self.config.sidecar_file_name.clone();
        let notifier = self.notifier.clone();
        self.pending_writes.retain(|task| !task.is_finished());
        self.pending_writes.push(runtime.spawn(async move {
            if let Err(err) = handle.write_file(&name, &payload).await {
                error!("event=sidecar_write module=sync status=error file={name} error={err}");
                notifier.error("Failed to write data to folder");
            }
        }));
    }

    async fn bootstrap_folder(&self, handle: &FolderHandle) -> FolderSyncOutcome {
        self.write_sidecar_now(handle).await;
        info!("event=folder_reconcile module=sync status=ok source=memory");
        FolderSyncOutcome::Bootstrapped
    }

    async fn write_sidecar_now(&self, handle: &FolderHandle) {
        let written = match self.store.snapshot().to_sidecar_json() {
            Ok(payload) => handle
                .write_file(&self.config.sidecar_file_name, &payload)
                .await
                .map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };
        if let Err(err) = written {
            error!("event=sidecar_write module=sync status=error error={err}");
            self.notifier.error("Failed to write data to folder");
        }
    }
}
