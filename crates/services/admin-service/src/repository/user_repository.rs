//! User repository.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{UserRecord, COLLECTION_USERS, FIELD_EMAIL};
use platform::{DocumentStore, Query};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by exact email match
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;
}

/// Document-store implementation of UserRepository
pub struct UserStore {
    store: Arc<dyn DocumentStore>,
}

impl UserStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let query = Query::new().where_eq(FIELD_EMAIL, email).limit(1);

        Ok(self
            .store
            .query(COLLECTION_USERS, query)
            .await?
            .into_iter()
            .next()
            .map(UserRecord::from))
    }
}
