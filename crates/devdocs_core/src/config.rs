//! Core configuration.
//!
//! # Responsibility
//! - Carry the fixed names used by persistence and export (cache keys,
//!   sidecar file, report title/file stem) plus the default log level.
//! - Load overrides from JSON; every field falls back to its default.
//!
//! # Invariants
//! - Validated configs have non-blank, distinct cache keys.
//! - File names never contain path separators.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_TASKS_CACHE_KEY: &str = "devdocs_tasks_cache";
pub const DEFAULT_DOCS_CACHE_KEY: &str = "devdocs_docs_cache";
pub const DEFAULT_SIDECAR_FILE_NAME: &str = ".devdocs-data.json";
pub const DEFAULT_REPORT_TITLE: &str = "DevDocs Report";
pub const DEFAULT_REPORT_FILE_STEM: &str = "DevDocs_Report";

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime settings shared by the sync coordinator and report export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub tasks_cache_key: String,
    pub docs_cache_key: String,
    pub sidecar_file_name: String,
    pub report_title: String,
    pub report_file_stem: String,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tasks_cache_key: DEFAULT_TASKS_CACHE_KEY.to_string(),
            docs_cache_key: DEFAULT_DOCS_CACHE_KEY.to_string(),
            sidecar_file_name: DEFAULT_SIDECAR_FILE_NAME.to_string(),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
            report_file_stem: DEFAULT_REPORT_FILE_STEM.to_string(),
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tasks_cache_key", &self.tasks_cache_key),
            ("docs_cache_key", &self.docs_cache_key),
            ("report_title", &self.report_title),
            ("log_level", &self.log_level),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{field}` cannot be blank")));
            }
        }
        if self.tasks_cache_key == self.docs_cache_key {
            return Err(ConfigError::Invalid(
                "task and document cache keys must differ".to_string(),
            ));
        }
        for (field, value) in [
            ("sidecar_file_name", &self.sidecar_file_name),
            ("report_file_stem", &self.report_file_stem),
        ] {
            if !is_plain_file_name(value) {
                return Err(ConfigError::Invalid(format!(
                    "`{field}` must be a plain file name, got `{value}`"
                )));
            }
        }
        Ok(())
    }
}

/// True when `name` names a single entry inside a directory.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed == name
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::{is_plain_file_name, ConfigError, CoreConfig, DEFAULT_SIDECAR_FILE_NAME};

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CoreConfig::from_json_str(r#"{ "report_title": "Weekly" }"#).unwrap();
        assert_eq!(config.report_title, "Weekly");
        assert_eq!(config.sidecar_file_name, DEFAULT_SIDECAR_FILE_NAME);
    }

    #[test]
    fn identical_cache_keys_are_rejected() {
        let err = CoreConfig::from_json_str(
            r#"{ "tasks_cache_key": "same", "docs_cache_key": "same" }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn sidecar_name_must_not_escape_folder() {
        assert!(is_plain_file_name(".devdocs-data.json"));
        assert!(!is_plain_file_name("../data.json"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(" padded"));
    }

    #[test]
    fn from_file_reads_json_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devdocs.json");
        std::fs::write(&path, r#"{ "sidecar_file_name": "tracker.json", "log_level": "warn" }"#)
            .unwrap();

        let config = CoreConfig::from_file(&path).unwrap();
        assert_eq!(config.sidecar_file_name, "tracker.json");
        assert_eq!(config.log_level, "warn");

        let err = CoreConfig::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
