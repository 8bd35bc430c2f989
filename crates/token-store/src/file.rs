//! File-backed storage implementation.

use crate::{StorageError, StorageResult, TokenStorage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// Storage backend persisting a string map as JSON on disk.
///
/// Every mutation is written through to the file, so stored credentials
/// survive process restarts. Reads are served from the in-memory map.
pub struct FileStorage {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) a file-backed store at the given path.
    pub fn open(path: PathBuf) -> StorageResult<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| StorageError::Encoding(e.to_string()))?
            }
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), entries = data.len(), "Opened token storage file");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Write the current map back to disk.
    fn persist(&self, data: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(data).map_err(|e| StorageError::Encoding(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| StorageError::Backend("storage lock poisoned".to_string()))?;
        data.insert(key.to_string(), value.to_string());
        self.persist(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|_| StorageError::Backend("storage lock poisoned".to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| StorageError::Backend("storage lock poisoned".to_string()))?;
        let existed = data.remove(key).is_some();
        if existed {
            self.persist(&data)?;
        }
        Ok(existed)
    }
}
