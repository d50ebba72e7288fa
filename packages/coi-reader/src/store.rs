//! Document storage: text blobs under string keys.
//!
//! The pipeline reads the source document and writes every intermediate
//! extract through this trait, so tests run on [`MemoryStore`] and batch jobs
//! on [`FsStore`] without touching the pipeline code.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{CoiError, Result};

/// Keyed text storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a document by key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a document.
    async fn put(&self, key: &str, content: &str) -> Result<()>;

    /// Get a document, failing if it is missing.
    async fn get_required(&self, key: &str) -> Result<String> {
        self.get(key).await?.ok_or_else(|| CoiError::DocumentNotFound {
            key: key.to_string(),
        })
    }
}

/// In-memory store for tests and development.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.read().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        self.documents
            .write()
            .unwrap()
            .insert(key.to_string(), content.to_string());
        Ok(())
    }
}

/// Filesystem store rooted at a directory; keys are relative paths.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoiError::Storage(Box::new(e))),
        }
    }

    async fn put(&self, key: &str, content: &str) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoiError::Storage(Box::new(e)))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| CoiError::Storage(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemoryStore::new();
        store.put("a/b.txt", "hello").await.unwrap();
        assert_eq!(store.get("a/b.txt").await.unwrap().unwrap(), "hello");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_required_missing() {
        let store = MemoryStore::new();
        let err = store.get_required("missing").await.unwrap_err();
        assert!(matches!(err, CoiError::DocumentNotFound { .. }));
    }
}
