//! Application configuration
//!
//! Persists the "current workspace" pointer and the chosen backend as a
//! small JSON file in the user config directory. The core stores never
//! read this; it exists so front ends can reopen the last workspace.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which persistence backend a workspace uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Decks as directories, cards as markdown files.
    FileTree,
    /// A single embedded SQLite index.
    Index,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::FileTree
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<PathBuf>,
    #[serde(default)]
    pub backend: BackendKind,
}

impl Config {
    /// Default config file location (`<config dir>/karuta/config.json`).
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("karuta").join("config.json"))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Load the config, or defaults when none has been written yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config.workspace_path, None);
        assert_eq!(config.backend, BackendKind::FileTree);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("karuta").join("config.json");

        let config = Config {
            workspace_path: Some(PathBuf::from("/home/me/cards")),
            backend: BackendKind::Index,
        };
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.workspace_path, config.workspace_path);
        assert_eq!(reloaded.backend, BackendKind::Index);
    }

    #[test]
    fn test_unknown_backend_variant_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"backend": "cloud"}"#).unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
