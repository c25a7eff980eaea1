//! Reference upload repository.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{UploadedImage, COLLECTION_UPLOADED_IMAGES};
use platform::DocumentStore;

use super::to_fields;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ENTITY: &str = "Reference image";

/// Upload repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Find upload record by ID
    async fn find_by_id(&self, id: &str) -> AppResult<Option<UploadedImage>>;

    /// Create or replace an upload record
    async fn save(&self, upload: &UploadedImage) -> AppResult<()>;

    /// Delete an upload record, returning whether it existed
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Document-store implementation of UploadRepository
pub struct UploadStore {
    store: Arc<dyn DocumentStore>,
}

impl UploadStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UploadRepository for UploadStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<UploadedImage>> {
        match self.store.get(COLLECTION_UPLOADED_IMAGES, id).await? {
            Some(doc) => Ok(Some(doc.decode(ENTITY)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, upload: &UploadedImage) -> AppResult<()> {
        let fields = to_fields(ENTITY, upload)?;
        self.store
            .set(COLLECTION_UPLOADED_IMAGES, &upload.id, fields)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        self.store.delete(COLLECTION_UPLOADED_IMAGES, id).await
    }
}
