use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_store_file() -> String {
    "langcapture.json".to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Directory holding the store file. Empty means the platform data dir
    /// chosen by the app.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

impl StorageConfig {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            store_file: default_store_file(),
        }
    }

    /// Full path of the store file under `fallback_dir` unless a data dir
    /// is configured
    pub fn store_path(&self, fallback_dir: &Path) -> PathBuf {
        let file = if self.store_file.trim().is_empty() {
            default_store_file()
        } else {
            self.store_file.clone()
        };

        self.data_dir
            .as_deref()
            .unwrap_or(fallback_dir)
            .join(file)
    }
}
