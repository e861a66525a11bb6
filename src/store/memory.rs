//! In-memory store backend for tests and local demo mode.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{HeadObject, ObjectSummary, StorageBackend, StoreError, StoreResult};

#[derive(Clone)]
struct MemoryObject {
    data: Bytes,
    content_type: String,
    metadata: HashMap<String, String>,
    last_modified: DateTime<Utc>,
}

/// In-memory `StorageBackend`.
///
/// Mirrors the remote store's semantics closely enough for the catalog to be
/// exercised against it: metadata travels with each write, `rewrite` keeps
/// the body and swaps the map, and enumeration is lexicographic the way S3
/// lists keys. Nothing persists between runs.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn head(&self, key: &str) -> StoreResult<Option<HeadObject>> {
        let objects = self.objects.read().await;
        Ok(objects.get(key).map(|obj| HeadObject {
            content_type: obj.content_type.clone(),
            size: obj.data.len() as u64,
            last_modified: obj.last_modified,
            metadata: obj.metadata.clone(),
        }))
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            MemoryObject {
                data,
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn rewrite(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        let mut objects = self.objects.write().await;
        let obj = objects
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        obj.content_type = content_type.to_string();
        obj.metadata = metadata.clone();
        obj.last_modified = Utc::now();
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut objects = self.objects.write().await;
        objects.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> StoreResult<Vec<ObjectSummary>> {
        let objects = self.objects.read().await;
        let mut summaries: Vec<ObjectSummary> = objects
            .iter()
            .map(|(key, obj)| ObjectSummary {
                key: key.clone(),
                size: obj.data.len() as u64,
                last_modified: obj.last_modified,
            })
            .collect();
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn put_and_head_round_trip() {
        let store = MemoryStore::new();
        store
            .put(
                "docs/a.txt",
                Bytes::from("hello"),
                "text/plain",
                &meta(&[("folder", "docs")]),
            )
            .await
            .unwrap();

        let head = store.head("docs/a.txt").await.unwrap().unwrap();
        assert_eq!(head.content_type, "text/plain");
        assert_eq!(head.size, 5);
        assert_eq!(head.metadata.get("folder").map(String::as_str), Some("docs"));
    }

    #[tokio::test]
    async fn head_missing_is_none_not_error() {
        let store = MemoryStore::new();
        assert!(store.head("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rewrite_preserves_body() {
        let store = MemoryStore::new();
        store
            .put("k", Bytes::from("body"), "text/plain", &meta(&[]))
            .await
            .unwrap();

        store
            .rewrite("k", "text/plain", &meta(&[("folder", "new")]))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Bytes::from("body"));
        let head = store.head("k").await.unwrap().unwrap();
        assert_eq!(head.metadata.get("folder").map(String::as_str), Some("new"));
    }

    #[tokio::test]
    async fn rewrite_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.rewrite("nope", "text/plain", &meta(&[])).await;
        assert!(matches!(err, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_is_lexicographic() {
        let store = MemoryStore::new();
        for key in ["b", "a", "c/d"] {
            store
                .put(key, Bytes::from("x"), "text/plain", &meta(&[]))
                .await
                .unwrap();
        }
        let keys: Vec<String> = store
            .list_keys()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c/d"]);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = MemoryStore::new();
        store
            .put("k", Bytes::from("x"), "text/plain", &meta(&[]))
            .await
            .unwrap();
        store.delete("k").await.unwrap();
        assert!(matches!(store.get("k").await, Err(StoreError::NotFound(_))));
    }
}
