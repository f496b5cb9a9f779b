//! Durable folder mirror.
//!
//! # Responsibility
//! - Hold the user-granted directory for the current session.
//! - Expose async read/write primitives; reconciliation lives in the
//!   coordinator.
//!
//! # Invariants
//! - State is `Disconnected` until the host hands over a granted directory.
//! - The grant is never persisted; every session must connect again.
//! - Only plain file names directly under the root are touched.

use super::PersistenceFault;
use crate::config::is_plain_file_name;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of the host's directory picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryPick {
    Granted(PathBuf),
    /// The user dismissed the picker.
    Cancelled,
    /// The host has no directory access capability at all.
    Unsupported,
}

/// Folder connection failure.
#[derive(Debug)]
pub enum FolderConnectError {
    Cancelled,
    Unsupported,
    NotADirectory(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FolderConnectError {
    /// Cancellation is silent; everything else is reported.
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl Display for FolderConnectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "directory selection cancelled"),
            Self::Unsupported => write!(f, "directory access is not supported"),
            Self::NotADirectory(path) => write!(f, "not a directory: {}", path.display()),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for FolderConnectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result of reading a file from the connected directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRead {
    Absent,
    Text(String),
    /// The file may exist but could not be read; callers must not overwrite it.
    Unreadable,
}

/// Cloneable handle to a connected directory.
///
/// Detached sidecar writes own a clone, so a later disconnect does not
/// cancel writes already issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderHandle {
    root: PathBuf,
}

impl FolderHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates or overwrites `name` with UTF-8 text.
    pub async fn write_file(&self, name: &str, content: &str) -> Result<(), PersistenceFault> {
        self.write_binary(name, content.as_bytes()).await
    }

    /// Creates or overwrites `name` with raw bytes.
    pub async fn write_binary(&self, name: &str, bytes: &[u8]) -> Result<(), PersistenceFault> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| PersistenceFault::Io {
                path: path.clone(),
                source,
            })?;
        debug!(
            "event=folder_write module=sync status=ok file={name} bytes={}",
            bytes.len()
        );
        Ok(())
    }

    /// Reads `name` as text, decoding invalid UTF-8 lossily.
    ///
    /// Only a missing file is `Absent`; any other fault is `Unreadable`.
    pub async fn read_file(&self, name: &str) -> FileRead {
        let path = match self.resolve(name) {
            Ok(path) => path,
            Err(err) => {
                warn!("event=folder_read module=sync status=error file={name} error={err}");
                return FileRead::Unreadable;
            }
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => FileRead::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) if err.kind() == ErrorKind::NotFound => FileRead::Absent,
            Err(err) => {
                warn!("event=folder_read module=sync status=error file={name} error={err}");
                FileRead::Unreadable
            }
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, PersistenceFault> {
        if !is_plain_file_name(name) {
            return Err(PersistenceFault::InvalidFileName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

/// Session-scoped folder adapter: `Disconnected -> Connected`.
#[derive(Debug, Default)]
pub struct FolderAdapter {
    handle: Option<FolderHandle>,
}

impl FolderAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&FolderHandle> {
        self.handle.as_ref()
    }

    /// Connects to the directory granted by the host.
    ///
    /// A failed attempt keeps any previous connection.
    pub async fn connect(
        &mut self,
        pick: DirectoryPick,
    ) -> Result<&FolderHandle, FolderConnectError> {
        let root = match pick {
            DirectoryPick::Granted(root) => root,
            DirectoryPick::Cancelled => return Err(FolderConnectError::Cancelled),
            DirectoryPick::Unsupported => return Err(FolderConnectError::Unsupported),
        };

        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|source| FolderConnectError::Io {
                path: root.clone(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(FolderConnectError::NotADirectory(root));
        }

        info!(
            "event=folder_connect module=sync status=ok root={}",
            root.display()
        );
        Ok(&*self.handle.insert(FolderHandle { root }))
    }

    /// Drops the grant. In-flight writes keep their own handle clones.
    pub fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!(
                "event=folder_disconnect module=sync status=ok root={}",
                handle.root.display()
            );
        }
    }

    /// Reads `name`; `Absent` while disconnected.
    pub async fn read_file(&self, name: &str) -> FileRead {
        match &self.handle {
            Some(handle) => handle.read_file(name).await,
            None => FileRead::Absent,
        }
    }

    pub async fn write_file(&self, name: &str, content: &str) -> Result<(), PersistenceFault> {
        match &self.handle {
            Some(handle) => handle.write_file(name, content).await,
            None => Err(PersistenceFault::Disconnected),
        }
    }
}
