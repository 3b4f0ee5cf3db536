//! Loader configuration.
//!
//! This module handles loading, validation, and defaulting of the
//! world-data resolution settings from TOML files.

use crate::error::WorldLoadError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_data_dir() -> PathBuf {
    PathBuf::from("worldData")
}

fn default_extension() -> String {
    "json".to_string()
}

/// Settings controlling how logical file names resolve to on-disk
/// world-data sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Base directory world-data files are resolved under
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File extension of world-data sources, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extension: default_extension(),
        }
    }
}

impl LoaderSettings {
    /// Loads settings from a TOML file.
    ///
    /// If the file doesn't exist, creates a default settings file at the
    /// specified path and returns the defaults.
    pub async fn load_from_file(path: &Path) -> Result<Self, WorldLoadError> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                WorldLoadError::Config(format!("failed to read {}: {}", path.display(), e))
            })?;
            let settings: LoaderSettings = toml::from_str(&content).map_err(|e| {
                WorldLoadError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?;
            Ok(settings)
        } else {
            let defaults = LoaderSettings::default();
            let content = toml::to_string_pretty(&defaults)
                .map_err(|e| WorldLoadError::Config(e.to_string()))?;
            tokio::fs::write(path, content).await.map_err(|e| {
                WorldLoadError::Config(format!("failed to write {}: {}", path.display(), e))
            })?;
            info!("Created default loader settings file: {}", path.display());
            Ok(defaults)
        }
    }

    /// Validates the settings for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir cannot be empty".to_string());
        }
        if self.extension.is_empty() {
            return Err("extension cannot be empty".to_string());
        }
        if self.extension.starts_with('.') {
            return Err(format!(
                "extension must not include a leading dot: {}",
                &self.extension
            ));
        }
        Ok(())
    }

    /// On-disk path for a logical file name.
    pub(crate) fn resolve(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, self.extension))
    }
}
