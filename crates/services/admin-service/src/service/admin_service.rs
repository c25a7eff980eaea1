//! Admin service - payment review and account lookup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use common::{AppResult, OptionExt};
use domain::{PaymentRecord, UserRecord};

use crate::repository::{PaymentRepository, UserRepository};

/// Admin service trait for dependency injection.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Pending bank-transfer payments with normalized timestamps
    async fn pending_payments(&self) -> AppResult<Vec<PaymentRecord>>;

    /// Look up a single account by email
    async fn find_user_by_email(&self, email: &str) -> AppResult<UserRecord>;
}

/// Concrete implementation of AdminService using repositories.
pub struct AdminManager {
    payments: Arc<dyn PaymentRepository>,
    users: Arc<dyn UserRepository>,
}

impl AdminManager {
    pub fn new(payments: Arc<dyn PaymentRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { payments, users }
    }
}

#[async_trait]
impl AdminService for AdminManager {
    async fn pending_payments(&self) -> AppResult<Vec<PaymentRecord>> {
        let now = Utc::now();
        let payments: Vec<PaymentRecord> = self
            .payments
            .find_pending_bank_transfers()
            .await?
            .into_iter()
            .map(|doc| PaymentRecord::from_document(doc, now))
            .collect();

        debug!(count = payments.len(), "Loaded pending payments");
        Ok(payments)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<UserRecord> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_not_found("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockPaymentRepository, MockUserRepository};
    use common::AppError;
    use domain::document::fields;
    use domain::Document;
    use mockall::predicate::eq;
    use serde_json::json;

    fn payment(id: &str, created_at: Option<serde_json::Value>) -> Document {
        let now = Utc::now();
        let mut stored = fields([
            ("status", json!("pending")),
            ("paymentMethod", json!("bank_transfer")),
        ]);
        if let Some(value) = created_at {
            stored.insert("createdAt".to_string(), value);
        }
        Document {
            id: id.to_string(),
            fields: stored,
            created_at: now,
            updated_at: now,
        }
    }

    fn manager(payments: MockPaymentRepository, users: MockUserRepository) -> AdminManager {
        AdminManager::new(Arc::new(payments), Arc::new(users))
    }

    #[tokio::test]
    async fn test_pending_payments_normalizes_timestamps() {
        let mut payments = MockPaymentRepository::new();
        payments.expect_find_pending_bank_transfers().returning(|| {
            Ok(vec![
                payment("p1", Some(json!({"_seconds": 1_700_000_000, "_nanoseconds": 0}))),
                payment("p2", None),
            ])
        });

        let before = Utc::now();
        let result = manager(payments, MockUserRepository::new())
            .pending_payments()
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "p1");
        assert_eq!(result[0].created_at.timestamp(), 1_700_000_000);
        assert!(result[1].created_at >= before);
        assert_eq!(result[1].status(), Some("pending"));
    }

    #[tokio::test]
    async fn test_pending_payments_propagates_errors() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_pending_bank_transfers()
            .returning(|| Err(AppError::internal("backend unavailable")));

        let err = manager(payments, MockUserRepository::new())
            .pending_payments()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "backend unavailable");
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("ada@example.com"))
            .returning(|email| {
                Ok(Some(UserRecord {
                    id: "u1".to_string(),
                    fields: fields([("email", json!(email))]),
                }))
            });

        let user = manager(MockPaymentRepository::new(), users)
            .find_user_by_email("ada@example.com")
            .await
            .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_find_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let err = manager(MockPaymentRepository::new(), users)
            .find_user_by_email("nobody@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "User not found");
    }
}
