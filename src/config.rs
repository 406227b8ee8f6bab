//! Application settings and paths.
//!
//! Default scan knobs live in an XDG-compliant JSON settings file and are
//! overridden by explicit command-line flags. Nothing else is persisted.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for config paths")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Path to the settings file under the XDG config dir.
fn settings_file() -> ConfigResult<PathBuf> {
    let project =
        ProjectDirs::from("com", "portsweep", "portsweep").ok_or(ConfigError::DirectoryNotFound)?;
    Ok(project.config_dir().join("settings.json"))
}

/// Scan defaults, applied when the corresponding flag is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default per-probe timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default concurrency bound; 0 means unbounded fan-out.
    pub default_concurrency: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: 10_000,
            default_concurrency: 0,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    ///
    /// A missing file yields the built-in defaults; a malformed one is an
    /// error so typos do not silently change scan behavior.
    pub fn load() -> ConfigResult<Self> {
        let file = settings_file()?;
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let file = settings_file()?;
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_timeout_ms, 10_000);
        assert_eq!(settings.default_concurrency, 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_timeout_ms": 2500, "default_concurrency": 500}}"#
        )
        .unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.default_timeout_ms, 2500);
        assert_eq!(settings.default_concurrency, 500);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_concurrency": 128}}"#).unwrap();

        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.default_concurrency, 128);
        assert_eq!(settings.default_timeout_ms, 10_000);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppSettings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = AppSettings {
            default_timeout_ms: 100,
            default_concurrency: 7,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
