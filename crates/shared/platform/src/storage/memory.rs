//! In-process object storage for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::AppResult;

use super::{validate_path, ObjectStorage, StoredObject};

#[derive(Debug, Default)]
pub struct MemoryObjectStorage {
    bucket: String,
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryObjectStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::default(),
        }
    }

    /// Raw bytes of a stored object
    pub async fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).map(|(bytes, _)| bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        validate_path(path)?;
        let size_bytes = bytes.len() as u64;
        self.objects
            .write()
            .await
            .insert(path.to_string(), (bytes, content_type.to_string()));

        Ok(StoredObject {
            path: path.to_string(),
            url: format!("memory://{}/{}", self.bucket, path),
            content_type: content_type.to_string(),
            size_bytes,
        })
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        validate_path(path)?;
        Ok(self.objects.write().await.remove(path).is_some())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
