//! Persistence and synchronization of the entity store.
//!
//! # Responsibility
//! - Mirror every store mutation to the profile cache and, when a folder is
//!   connected, to the sidecar file.
//! - Decide the authoritative source when a folder gets connected.
//!
//! # Invariants
//! - Persistence faults never roll back in-memory state.
//! - Faults are logged and turned into notifications at the coordinator
//!   boundary; they never reach mutation callers.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod cache;
pub mod coordinator;
pub mod folder;
pub mod notify;

/// Cache or folder I/O failure.
#[derive(Debug)]
pub enum PersistenceFault {
    Cache(DbError),
    Encode(serde_json::Error),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    InvalidFileName(String),
    Disconnected,
}

impl Display for PersistenceFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache(err) => write!(f, "cache write failed: {err}"),
            Self::Encode(err) => write!(f, "snapshot encoding failed: {err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidFileName(name) => write!(f, "invalid file name `{name}`"),
            Self::Disconnected => write!(f, "no folder connected"),
        }
    }
}

impl Error for PersistenceFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cache(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::InvalidFileName(_) | Self::Disconnected => None,
        }
    }
}

impl From<DbError> for PersistenceFault {
    fn from(value: DbError) -> Self {
        Self::Cache(value)
    }
}

impl From<serde_json::Error> for PersistenceFault {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}
