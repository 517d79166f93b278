//! Persistent key-value stores (the "player prefs" collaborator).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use adgate_core::StoreError;

/// A string-to-string store that survives process restarts.
///
/// Owned by a single task (the controller), hence `&mut self` on writes
/// and no `Sync` bound.
pub trait KeyValueStore: Send + 'static {
    /// Returns the stored value, or `default` when the key is absent.
    fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError>;

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A store that forgets everything on exit.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError> {
        Ok(self
            .values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A store backed by a single JSON object on disk.
///
/// The whole file is rewritten on every `set_string`; it is written to a
/// sibling temp file first and renamed into place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "key-value store opened");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.values)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError> {
        Ok(self
            .values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
