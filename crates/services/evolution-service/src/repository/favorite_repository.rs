//! Favorite repository.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{Favorite, COLLECTION_FAVORITES, FIELD_USER_ID};
use platform::{DocumentStore, Order, Query};

use super::{decode_all, to_fields};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ENTITY: &str = "Favorite";

/// Favorite repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Find a user's favorite marker on an image (never another user's)
    async fn find(&self, user_id: &str, image_id: &str) -> AppResult<Option<Favorite>>;

    /// A user's favorites, most recently added first
    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Favorite>>;

    /// Create or replace a favorite
    async fn save(&self, favorite: &Favorite) -> AppResult<()>;

    /// Remove a favorite, returning whether it existed
    async fn delete(&self, user_id: &str, image_id: &str) -> AppResult<bool>;
}

/// Document-store implementation of FavoriteRepository
pub struct FavoriteStore {
    store: Arc<dyn DocumentStore>,
}

impl FavoriteStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FavoriteRepository for FavoriteStore {
    async fn find(&self, user_id: &str, image_id: &str) -> AppResult<Option<Favorite>> {
        let key = Favorite::key(user_id, image_id);
        let favorite: Option<Favorite> = match self.store.get(COLLECTION_FAVORITES, &key).await? {
            Some(doc) => Some(doc.decode(ENTITY)?),
            None => None,
        };

        Ok(favorite.filter(|f| f.user_id == user_id && f.image_id == image_id))
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Favorite>> {
        let query = Query::new()
            .where_eq(FIELD_USER_ID, user_id)
            .order(Order::NewestFirst);
        let docs = self.store.query(COLLECTION_FAVORITES, query).await?;

        decode_all(docs, ENTITY)
    }

    async fn save(&self, favorite: &Favorite) -> AppResult<()> {
        let fields = to_fields(ENTITY, favorite)?;
        self.store
            .set(COLLECTION_FAVORITES, &favorite.id, fields)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, image_id: &str) -> AppResult<bool> {
        // Only the owner's own marker may be removed
        let Some(favorite) = self.find(user_id, image_id).await? else {
            return Ok(false);
        };
        self.store.delete(COLLECTION_FAVORITES, &favorite.id).await
    }
}
