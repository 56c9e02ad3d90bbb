use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Interface to a hosted document/blob backend. Only the surface lives
/// here; wiring up an actual service is a deployment concern.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or overwrite a document.
    async fn save(&self, collection: &str, id: &str, doc: &Value) -> Result<()>;
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;
    /// Every document in a collection, unordered.
    async fn list(&self, collection: &str) -> Result<Vec<Value>>;
    /// Deleting a missing document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
    /// Store raw bytes and return a URL they can be fetched under.
    async fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<String>;
    async fn delete_blob(&self, url: &str) -> Result<()>;
}

/// In-process implementation for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, Value>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        MemoryDocumentStore::default()
    }

    fn doc_key(collection: &str, id: &str) -> String {
        format!("{collection}/{id}")
    }

    fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
        mutex.lock().map_err(|_| StoreError::Poisoned)
    }

    #[must_use]
    pub fn blob(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(url).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn save(&self, collection: &str, id: &str, doc: &Value) -> Result<()> {
        Self::lock(&self.documents)?.insert(Self::doc_key(collection, id), doc.clone());
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(Self::lock(&self.documents)?
            .get(&Self::doc_key(collection, id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let prefix = format!("{collection}/");
        Ok(Self::lock(&self.documents)?
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        Self::lock(&self.documents)?.remove(&Self::doc_key(collection, id));
        Ok(())
    }

    async fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let url = format!("memory://{path}");
        Self::lock(&self.blobs)?.insert(url.clone(), bytes.to_vec());
        Ok(url)
    }

    async fn delete_blob(&self, url: &str) -> Result<()> {
        let mut blobs = Self::lock(&self.blobs)?;
        blobs
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| StoreError::BlobNotFound {
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_document_round_trip() {
        let store = MemoryDocumentStore::new();
        store
            .save("members", "m1", &json!({"name": "Ravi"}))
            .await
            .unwrap();

        let doc = store.get("members", "m1").await.unwrap().unwrap();
        assert_eq!(doc["name"], "Ravi");
        assert!(store.get("members", "m2").await.unwrap().is_none());

        store.delete("members", "m1").await.unwrap();
        assert!(store.get("members", "m1").await.unwrap().is_none());
        // deleting again is a no-op
        store.delete("members", "m1").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_collection() {
        let store = MemoryDocumentStore::new();
        store.save("members", "m1", &json!({"n": 1})).await.unwrap();
        store.save("members", "m2", &json!({"n": 2})).await.unwrap();
        store.save("mandals", "x", &json!({"n": 3})).await.unwrap();

        assert_eq!(store.list("members").await.unwrap().len(), 2);
        assert_eq!(store.list("mandals").await.unwrap().len(), 1);
        assert!(store.list("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_poisoned_lock_surfaces_as_error() {
        let store = std::sync::Arc::new(MemoryDocumentStore::new());
        store.save("members", "m1", &json!({})).await.unwrap();

        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.lock().unwrap();
            panic!("poison the documents lock");
        })
        .join();

        assert!(matches!(
            store.save("members", "m2", &json!({})).await,
            Err(StoreError::Poisoned)
        ));
        assert!(store.delete("members", "m1").await.is_err());
        assert!(store.get("members", "m1").await.is_err());
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let store = MemoryDocumentStore::new();
        let url = store
            .upload_blob("exports/roster.xlsx", b"bytes")
            .await
            .unwrap();
        assert!(url.starts_with("memory://"));
        assert_eq!(store.blob(&url).unwrap(), b"bytes");

        store.delete_blob(&url).await.unwrap();
        assert!(store.delete_blob(&url).await.is_err());
    }
}
