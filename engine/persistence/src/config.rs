//! Configuration for the persistence layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the file-backed store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base directory for the store file
    pub data_dir: PathBuf,

    /// Name of the database file inside `data_dir`
    pub file_name: String,

    /// Whether to fsync the file before it replaces the previous one
    pub fsync_on_commit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            file_name: "league.json".to_string(),
            fsync_on_commit: true,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// Path of the committed database file
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Path a commit is staged at before it is renamed into place
    pub fn staging_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.tmp", self.file_name))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("Store file_name must not be empty".to_string());
        }

        if self.file_name.contains(['/', '\\']) {
            return Err(format!("Store file_name must be a bare file name: {}", self.file_name));
        }

        Ok(())
    }
}
