//! Durable key-value parameter store
//!
//! The gateway persists exactly one value here: the resolved memory
//! resource id, keyed by deployment environment, so restarts reuse the
//! resource instead of provisioning a duplicate. Writes are
//! last-writer-wins; the store is a soft cache, never authoritative,
//! and errors from it propagate unchanged with no retry.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Durable key-value configuration store.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Look up a parameter by path.
    async fn get(&self, path: &str) -> Result<Option<String>>;

    /// Write a parameter, overwriting any existing value.
    async fn put(&self, path: &str, value: &str) -> Result<()>;
}

/// In-process parameter store (for development/testing).
///
/// Values are lost on restart, so every fresh process re-resolves the
/// resource id from the backend. Use [`FileParameterStore`] where
/// restart reuse matters.
#[derive(Default)]
pub struct InMemoryParameterStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryParameterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get(&self, path: &str) -> Result<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(path).cloned())
    }

    async fn put(&self, path: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().await;
        values.insert(path.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed parameter store.
///
/// All parameters live in one JSON file; each write re-reads,
/// modifies, and rewrites it. Suitable for single-host deployments —
/// concurrent writers across hosts still race with last-writer-wins
/// semantics, exactly like the in-memory store.
pub struct FileParameterStore {
    file: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileParameterStore {
    /// Create a store backed by `dir/parameters.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterStore`] if the directory cannot be
    /// created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::ParameterStore(format!("cannot create {}: {e}", dir.display())))?;

        Ok(Self {
            file: dir.join("parameters.json"),
            lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Create a store under the platform data directory.
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| Error::ParameterStore("no platform data directory".to_string()))?;
        Self::new(base.join("memgate"))
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.file) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::ParameterStore(format!("corrupt parameter file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::ParameterStore(format!(
                "cannot read {}: {e}",
                self.file.display()
            ))),
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.file, raw).map_err(|e| {
            Error::ParameterStore(format!("cannot write {}: {e}", self.file.display()))
        })
    }
}

#[async_trait]
impl ParameterStore for FileParameterStore {
    async fn get(&self, path: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.get(path).cloned())
    }

    async fn put(&self, path: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.load()?;
        values.insert(path.to_string(), value.to_string());
        self.save(&values)?;
        debug!(path = %path, "parameter written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryParameterStore::new();
        assert!(store.get("/dev/memory_resource_id").await.unwrap().is_none());

        store.put("/dev/memory_resource_id", "m-1").await.unwrap();
        assert_eq!(
            store.get("/dev/memory_resource_id").await.unwrap().as_deref(),
            Some("m-1")
        );
    }

    #[tokio::test]
    async fn test_in_memory_store_overwrites() {
        let store = InMemoryParameterStore::new();
        store.put("/dev/id", "first").await.unwrap();
        store.put("/dev/id", "second").await.unwrap();
        assert_eq!(store.get("/dev/id").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileParameterStore::new(dir.path()).unwrap();
            store.put("/prod/memory_resource_id", "m-9").await.unwrap();
        }

        let reopened = FileParameterStore::new(dir.path()).unwrap();
        assert_eq!(
            reopened
                .get("/prod/memory_resource_id")
                .await
                .unwrap()
                .as_deref(),
            Some("m-9")
        );
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileParameterStore::new(dir.path()).unwrap();
        assert!(store.get("/anything").await.unwrap().is_none());
    }
}
