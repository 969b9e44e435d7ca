//! File-backed string key-value store.
//!
//! Keys map to `<dir>/<key>.json`. Values are opaque strings (JSON by
//! convention). Corrupt or unreadable entries are treated as absent rather
//! than surfaced as errors; callers that need structure go through
//! `load_json`, which falls back to the type's default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Raw string read. Missing or unreadable keys read as `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.key_path(key);
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(s) => Some(s),
            Err(e) => {
                debug!(key, error = %e, "Failed to read store key");
                None
            }
        }
    }

    /// Raw string write, replacing any previous value for the key.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.key_path(key), value)
            .with_context(|| format!("Failed to write store key {}", key))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove store key {}", key))?;
        }
        Ok(())
    }

    /// Deserialize a key, treating missing or unparseable data as the
    /// default value. Parse failures never propagate to the caller.
    pub fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key) {
            Some(contents) => match serde_json::from_str(&contents) {
                Ok(value) => value,
                Err(e) => {
                    debug!(key, error = %e, "Corrupt store entry, using default");
                    T::default()
                }
            },
            None => T::default(),
        }
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let contents = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize store key {}", key))?;
        self.set(key, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store() -> (tempfile::TempDir, KvStore) {
        let dir = tempfile::tempdir().unwrap();
        let kv = KvStore::new(dir.path().to_path_buf()).unwrap();
        (dir, kv)
    }

    #[test]
    fn test_get_set_roundtrip() {
        let (_dir, kv) = store();
        assert_eq!(kv.get("grade"), None);
        kv.set("grade", "7").unwrap();
        assert_eq!(kv.get("grade").as_deref(), Some("7"));
        kv.set("grade", "8").unwrap();
        assert_eq!(kv.get("grade").as_deref(), Some("8"));
    }

    #[test]
    fn test_corrupt_json_loads_as_default() {
        let (_dir, kv) = store();
        kv.set("progress", "{not json at all").unwrap();
        let map: HashMap<String, i64> = kv.load_json("progress");
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, kv) = store();
        kv.set("theme", "\"dark\"").unwrap();
        kv.remove("theme").unwrap();
        kv.remove("theme").unwrap();
        assert_eq!(kv.get("theme"), None);
    }
}
