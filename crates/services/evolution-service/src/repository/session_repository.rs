//! Evolution session repository.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::document::fields;
use domain::{EvolutionSession, COLLECTION_EVOLUTION_SESSIONS, FIELD_REVISION, FIELD_USER_ID};
use serde_json::Value;
use platform::{DocumentStore, Order, Query};

use super::{decode_all, to_fields};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ENTITY: &str = "Evolution session";

/// Session repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find session by ID regardless of owner
    async fn find_by_id(&self, id: &str) -> AppResult<Option<EvolutionSession>>;

    /// Sessions owned by a user, newest first
    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<EvolutionSession>>;

    /// Create or replace a session
    async fn save(&self, session: &EvolutionSession) -> AppResult<()>;

    /// Store a changed session only if the stored copy is still at
    /// `expected_revision`; returns whether it was stored.
    async fn replace(&self, session: &EvolutionSession, expected_revision: u64)
        -> AppResult<bool>;
}

/// Document-store implementation of SessionRepository
pub struct SessionStore {
    store: Arc<dyn DocumentStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<EvolutionSession>> {
        match self.store.get(COLLECTION_EVOLUTION_SESSIONS, id).await? {
            Some(doc) => Ok(Some(doc.decode(ENTITY)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<EvolutionSession>> {
        let query = Query::new()
            .where_eq(FIELD_USER_ID, user_id)
            .order(Order::NewestFirst);
        let docs = self.store.query(COLLECTION_EVOLUTION_SESSIONS, query).await?;

        decode_all(docs, ENTITY)
    }

    async fn save(&self, session: &EvolutionSession) -> AppResult<()> {
        let fields = to_fields(ENTITY, session)?;
        self.store
            .set(COLLECTION_EVOLUTION_SESSIONS, &session.id, fields)
            .await?;
        Ok(())
    }

    async fn replace(
        &self,
        session: &EvolutionSession,
        expected_revision: u64,
    ) -> AppResult<bool> {
        let expected = fields([(FIELD_REVISION, Value::from(expected_revision))]);
        let data = to_fields(ENTITY, session)?;
        self.store
            .replace_if(COLLECTION_EVOLUTION_SESSIONS, &session.id, expected, data)
            .await
    }
}
