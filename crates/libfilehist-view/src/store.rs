//! Key-value state persisted between sessions

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::ViewError;

/// Persisted key-value state
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<Value>, ViewError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), ViewError>;
}

/// State kept as one JSON object in a file, rewritten on every `set`
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store; a missing file is an empty store
    pub fn open(path: &Path) -> Result<Self, ViewError> {
        let values = if path.exists() {
            let content = fs::read_to_string(path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), ViewError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Atomic replace
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.values)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = self.values.len(), "state saved");
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, ViewError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), ViewError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// `state.json` next to the default config file
pub fn default_state_path() -> Option<PathBuf> {
    libfilehist_core::config::default_config_path().map(|p| p.with_file_name("state.json"))
}
