//! Persistent key-value store used for client-side state (approval overlay,
//! session fallback). Injected as a trait object so tests can swap in
//! [`MemoryStore`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::common::errors::{ConsoleError, Result};

pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// JSON file holding a flat `{ "key": "value" }` object.
pub struct FileStore {
    path: PathBuf,
    // serialises read-modify-write on the file within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| ConsoleError::Storage("local store lock poisoned".to_string()))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _g = self.guard()?;
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _g = self.guard()?;
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _g = self.guard()?;
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| ConsoleError::Storage("memory store lock poisoned".to_string()))
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nope.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::new(&path);
        store.set("userId", "u-1").unwrap();
        store.set("approvedWallpapers", "[\"a\"]").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("userId").unwrap().as_deref(), Some("u-1"));
        assert_eq!(reopened.get("approvedWallpapers").unwrap().as_deref(), Some("[\"a\"]"));

        reopened.remove("userId").unwrap();
        assert_eq!(store.get("userId").unwrap(), None);
        assert!(store.get("approvedWallpapers").unwrap().is_some());
    }

    #[test]
    fn file_store_corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.get("k"), Err(ConsoleError::Storage(_))));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
