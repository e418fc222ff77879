//! In-process object store
//!
//! Holds every object in a sorted map behind an async lock. Used as the
//! demo backend and as the base of most tests.

use crate::backend::{paginate, ListPage, ListRequest, ObjectData, ObjectSummary, PutReceipt, StorageBackend};
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

impl StoredObject {
    fn summary(&self, key: &str) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            size: self.body.len() as u64,
            last_modified: Some(self.last_modified),
            content_type: Some(self.content_type.clone()),
        }
    }
}

/// Object store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryBackend {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Returns true if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Returns every key in sort order
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Returns true if the key exists
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage> {
        let objects = self.objects.read().await;
        let matching = objects
            .range(request.prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&request.prefix))
            .map(|(key, object)| object.summary(key));

        Ok(paginate(matching, request))
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectData> {
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        Ok(ObjectData {
            body: object.body.clone(),
            content_type: Some(object.content_type.clone()),
        })
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<PutReceipt> {
        if key.is_empty() {
            return Err(StorageError::backend("invalid_key", "empty key"));
        }

        let size = body.len() as u64;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );

        Ok(PutReceipt {
            key: key.to_string(),
            size,
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = MemoryBackend::new();

        let receipt = backend
            .put("Docs/a.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .unwrap();
        assert_eq!(receipt.size, 5);

        let data = backend.get("Docs/a.txt").await.unwrap();
        assert_eq!(data.body, Bytes::from_static(b"hello"));
        assert_eq!(data.content_type.as_deref(), Some("text/plain"));

        backend.delete("Docs/a.txt").await.unwrap();
        assert!(backend.get("Docs/a.txt").await.unwrap_err().is_not_found());
        assert!(backend.delete("Docs/a.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let backend = MemoryBackend::new();
        backend.put("a", Bytes::from_static(b"1"), "text/plain").await.unwrap();
        backend.put("a", Bytes::from_static(b"22"), "text/csv").await.unwrap();

        let data = backend.get("a").await.unwrap();
        assert_eq!(data.body.len(), 2);
        assert_eq!(data.content_type.as_deref(), Some("text/csv"));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let backend = MemoryBackend::new();
        let err = backend.put("", Bytes::new(), "text/plain").await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_with_delimiter() {
        let backend = MemoryBackend::new();
        for key in ["Docs/.folder", "Docs/a.txt", "Docs/sub/b.txt", "top.txt", "Documents/c.txt"] {
            backend.put(key, Bytes::from_static(b"x"), "text/plain").await.unwrap();
        }

        let page = backend
            .list(&ListRequest::new("Docs/").with_delimiter(Some('/')))
            .await
            .unwrap();
        assert_eq!(page.common_prefixes, vec!["Docs/sub/".to_string()]);
        assert_eq!(
            page.keys(),
            vec!["Docs/.folder".to_string(), "Docs/a.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_all_pages_through() {
        let backend = MemoryBackend::new();
        for i in 0..25 {
            backend
                .put(&format!("bulk/{:03}.bin", i), Bytes::from_static(b"x"), "application/octet-stream")
                .await
                .unwrap();
        }

        let first = backend
            .list(&ListRequest::new("bulk/").with_max_keys(10))
            .await
            .unwrap();
        assert_eq!(first.objects.len(), 10);
        assert!(first.next_start_after.is_some());

        let all = backend.list_all("bulk/", None).await.unwrap();
        assert_eq!(all.objects.len(), 25);
        assert!(all.next_start_after.is_none());
    }
}
