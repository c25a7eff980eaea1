//! Filesystem-backed object storage.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use common::{AppError, AppResult};

use super::{validate_path, ObjectStorage, StoredObject};

/// Stores objects under `{root}/{bucket}/` and serves them from
/// `{base_url}/files/{bucket}/`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    bucket: String,
    base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory holding the bucket's objects
    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/files/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        validate_path(path)?;
        let target = self.bucket_dir().join(path);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
        }

        let size_bytes = bytes.len() as u64;
        fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::storage(e.to_string()))?;
        debug!(path, size_bytes, "Stored object");

        Ok(StoredObject {
            path: path.to_string(),
            url: self.url_for(path),
            content_type: content_type.to_string(),
            size_bytes,
        })
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        validate_path(path)?;
        match fs::remove_file(self.bucket_dir().join(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::storage(e.to_string())),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
