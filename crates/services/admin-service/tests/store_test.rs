//! Admin repositories against the in-memory document store.

use std::sync::Arc;

use serde_json::json;
use tokio_test::assert_ok;

use admin_service_lib::{AdminManager, AdminService, PaymentStore, UserStore};
use domain::document::fields;
use platform::{DocumentStore, MemoryDocumentStore};

async fn seeded_store() -> Arc<MemoryDocumentStore> {
    let store = Arc::new(MemoryDocumentStore::new());

    for (status, method) in [
        ("pending", "bank_transfer"),
        ("paid", "bank_transfer"),
        ("pending", "card"),
        ("pending", "bank_transfer"),
    ] {
        assert_ok!(
            store
                .insert(
                    "payments",
                    fields([
                        ("status", json!(status)),
                        ("paymentMethod", json!(method)),
                        ("createdAt", json!("2024-03-01T12:00:00Z")),
                    ]),
                )
                .await
        );
    }

    assert_ok!(
        store
            .set(
                "users",
                "user-1",
                fields([("email", json!("ada@example.com")), ("name", json!("Ada"))]),
            )
            .await
    );
    store
}

fn manager(store: Arc<MemoryDocumentStore>) -> AdminManager {
    AdminManager::new(
        Arc::new(PaymentStore::new(store.clone())),
        Arc::new(UserStore::new(store)),
    )
}

#[tokio::test]
async fn test_only_pending_bank_transfers_are_listed() {
    let service = manager(seeded_store().await);

    let payments = service.pending_payments().await.unwrap();
    assert_eq!(payments.len(), 2);
    for payment in &payments {
        assert_eq!(payment.status(), Some("pending"));
        assert_eq!(payment.payment_method(), Some("bank_transfer"));
        assert_eq!(payment.created_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }
}

#[tokio::test]
async fn test_user_lookup_by_email() {
    let service = manager(seeded_store().await);

    let user = service.find_user_by_email("ada@example.com").await.unwrap();
    assert_eq!(user.id, "user-1");
    assert_eq!(user.fields["name"], "Ada");

    assert!(service.find_user_by_email("nobody@x.com").await.is_err());
}
