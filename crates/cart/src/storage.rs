//! Key-value storage backends for cart persistence.
//!
//! The cart is persisted as a single serialized blob under one fixed
//! namespace key. The [`KeyValueStore`] trait keeps the backend opaque to the
//! store; two implementations are provided:
//!
//! - [`MemoryStore`] - in-process map, used in tests and as the default when
//!   no storage directory is configured
//! - [`FileStore`] - one file per key under a local directory, the durable
//!   backend for on-device storage

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the storage layer and the blob codec.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cart blob could not be serialized or deserialized.
    #[error("cart blob codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// An opaque string-blob key-value store.
///
/// Mirrors the contract of a device-local storage API: `get` resolves to the
/// stored value or `None` when the key is absent, `set` overwrites the prior
/// value in full. No transactions, no partial writes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any prior value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// In-process key-value store backed by a map.
///
/// Contents live for the lifetime of the process only. Cheap to clone; all
/// clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a single entry.
    ///
    /// Convenient for hydration tests.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed key-value store: one file per key under a root directory.
///
/// Keys may contain characters that are not filesystem-safe (the default
/// cart key is `@Marketplace:Products`), so each key is mapped to a
/// sanitized `<key>.json` file name. The root directory is created on first
/// write.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory does not need to exist
    /// yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store writes under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.root.join(format!("{sanitized}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for_key(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path_for_key(key), value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_absent_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_set_overwrites_in_full() {
        let store = MemoryStore::new();
        store.set("k", "first".to_string()).await.unwrap();
        store.set("k", "second".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(clone.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .set("@Marketplace:Products", "[1,2,3]".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("@Marketplace:Products").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn test_file_store_absent_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_key_for_file_name() {
        let store = FileStore::new("/tmp/cart");
        let path = store.path_for_key("@Marketplace:Products");
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("-Marketplace-Products.json")
        );
    }
}
