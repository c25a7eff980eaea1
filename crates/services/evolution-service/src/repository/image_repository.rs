//! Generated image repository.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{GeneratedImage, COLLECTION_IMAGES, FIELD_SESSION_ID, FIELD_STYLE, FIELD_USER_ID};
use platform::{DocumentStore, Order, Query};

use super::{decode_all, to_fields};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ENTITY: &str = "Image";

/// Equality filter over a user's images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageFilter {
    pub user_id: String,
    pub style: Option<String>,
    pub session_id: Option<String>,
}

impl ImageFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, image: &GeneratedImage) -> bool {
        image.user_id == self.user_id
            && self.style.as_ref().map_or(true, |s| image.style.as_ref() == Some(s))
            && self
                .session_id
                .as_ref()
                .map_or(true, |s| image.session_id.as_ref() == Some(s))
    }

    fn to_query(&self) -> Query {
        let mut query = Query::new().where_eq(FIELD_USER_ID, self.user_id.as_str());
        if let Some(style) = &self.style {
            query = query.where_eq(FIELD_STYLE, style.as_str());
        }
        if let Some(session_id) = &self.session_id {
            query = query.where_eq(FIELD_SESSION_ID, session_id.as_str());
        }
        query
    }
}

/// Image repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Find image by ID regardless of owner
    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedImage>>;

    /// One page of matching images, newest first
    async fn list(&self, filter: &ImageFilter, offset: u64, limit: u64)
        -> AppResult<Vec<GeneratedImage>>;

    /// Number of matching images
    async fn count(&self, filter: &ImageFilter) -> AppResult<u64>;

    /// Create or replace an image
    async fn save(&self, image: &GeneratedImage) -> AppResult<()>;
}

/// Document-store implementation of ImageRepository
pub struct ImageStore {
    store: Arc<dyn DocumentStore>,
}

impl ImageStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ImageRepository for ImageStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedImage>> {
        match self.store.get(COLLECTION_IMAGES, id).await? {
            Some(doc) => Ok(Some(doc.decode(ENTITY)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &ImageFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<GeneratedImage>> {
        let query = filter
            .to_query()
            .order(Order::NewestFirst)
            .offset(offset)
            .limit(limit);
        let docs = self.store.query(COLLECTION_IMAGES, query).await?;

        decode_all(docs, ENTITY)
    }

    async fn count(&self, filter: &ImageFilter) -> AppResult<u64> {
        self.store.count(COLLECTION_IMAGES, filter.to_query()).await
    }

    async fn save(&self, image: &GeneratedImage) -> AppResult<()> {
        let fields = to_fields(ENTITY, image)?;
        self.store.set(COLLECTION_IMAGES, &image.id, fields).await?;
        Ok(())
    }
}
