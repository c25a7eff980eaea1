//! Payment repository.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{
    Document, COLLECTION_PAYMENTS, FIELD_PAYMENT_METHOD, FIELD_STATUS,
    PAYMENT_METHOD_BANK_TRANSFER, PAYMENT_STATUS_PENDING,
};
use platform::{DocumentStore, Query};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Payment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Bank-transfer payments still awaiting confirmation, in no particular order
    async fn find_pending_bank_transfers(&self) -> AppResult<Vec<Document>>;
}

/// Document-store implementation of PaymentRepository
pub struct PaymentStore {
    store: Arc<dyn DocumentStore>,
}

impl PaymentStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn find_pending_bank_transfers(&self) -> AppResult<Vec<Document>> {
        let query = Query::new()
            .where_eq(FIELD_STATUS, PAYMENT_STATUS_PENDING)
            .where_eq(FIELD_PAYMENT_METHOD, PAYMENT_METHOD_BANK_TRANSFER);

        self.store.query(COLLECTION_PAYMENTS, query).await
    }
}
