use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where and how snapshot files are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one snapshot file per declared type.
    pub data_dir: PathBuf,
    /// Prepended to the type name to form the snapshot file name.
    pub file_prefix: String,
    /// `fsync` the temporary file before it replaces the snapshot.
    pub sync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_prefix: ".db_".into(),
            sync: true,
        }
    }
}

impl StoreConfig {
    /// Default settings rooted at `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Snapshot file for a declared type: `<data_dir>/<prefix><TypeName>.json`.
    pub fn snapshot_path(&self, type_name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}{}.json", self.file_prefix, type_name))
    }
}
