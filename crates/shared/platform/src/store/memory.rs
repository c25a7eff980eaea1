//! In-process document store for tests and local development.

use std::collections::hash_map::{Entry, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use common::AppResult;
use domain::{Document, Fields};

use super::{DocumentStore, Order, Query};

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    /// Insertion sequence, breaks creation-time ties
    seq: u64,
}

/// Document store backed by in-memory maps.
///
/// Unordered queries return documents in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<String, StoredDocument>>>,
    next_seq: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, AtomicOrdering::Relaxed)
    }

    async fn matching(&self, collection: &str, query: &Query) -> Vec<StoredDocument> {
        let collections = self.collections.read().await;
        let mut entries: Vec<StoredDocument> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|entry| query.matches(&entry.document.fields))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match query.order {
            Some(Order::NewestFirst) => entries.sort_by(|a, b| {
                (b.document.created_at, b.seq).cmp(&(a.document.created_at, a.seq))
            }),
            Some(Order::OldestFirst) => entries.sort_by(|a, b| {
                (a.document.created_at, a.seq).cmp(&(b.document.created_at, b.seq))
            }),
            None => entries.sort_by_key(|entry| entry.seq),
        }
        entries
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|entry| entry.document.clone()))
    }

    async fn query(&self, collection: &str, query: Query) -> AppResult<Vec<Document>> {
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(self
            .matching(collection, &query)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|entry| entry.document)
            .collect())
    }

    async fn count(&self, collection: &str, query: Query) -> AppResult<u64> {
        Ok(self.matching(collection, &query).await.len() as u64)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> AppResult<Document> {
        let id = Document::new_id();
        self.set(collection, &id, fields).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> AppResult<Document> {
        let now = Utc::now();
        let seq = self.next_seq();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let stored = match docs.entry(id.to_string()) {
            Entry::Occupied(occupied) => {
                let stored = occupied.into_mut();
                stored.document.fields = fields;
                stored.document.updated_at = now;
                stored
            }
            Entry::Vacant(vacant) => vacant.insert(StoredDocument {
                document: Document {
                    id: id.to_string(),
                    fields,
                    created_at: now,
                    updated_at: now,
                },
                seq,
            }),
        };

        Ok(stored.document.clone())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> AppResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(stored) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(None);
        };

        stored.document.fields.extend(patch);
        stored.document.updated_at = Utc::now();
        Ok(Some(stored.document.clone()))
    }

    async fn replace_if(
        &self,
        collection: &str,
        id: &str,
        expected: Fields,
        fields: Fields,
    ) -> AppResult<bool> {
        let condition = Query {
            filters: expected,
            ..Query::default()
        };
        let mut collections = self.collections.write().await;
        let Some(stored) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .filter(|stored| condition.matches(&stored.document.fields))
        else {
            return Ok(false);
        };

        stored.document.fields = fields;
        stored.document.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::document::fields;
    use serde_json::json;
    use tokio_test::assert_ok;

    async fn seeded() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        for (status, method) in [
            ("pending", "bank_transfer"),
            ("completed", "bank_transfer"),
            ("pending", "card"),
            ("pending", "bank_transfer"),
        ] {
            store
                .insert(
                    "payments",
                    fields([("status", json!(status)), ("paymentMethod", json!(method))]),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_query_filters_by_equality() {
        let store = seeded().await;
        let query = Query::new()
            .where_eq("status", "pending")
            .where_eq("paymentMethod", "bank_transfer");

        let docs = store.query("payments", query.clone()).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| query.matches(&d.fields)));
        assert_eq!(store.count("payments", query).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unordered_query_is_stable() {
        let store = seeded().await;
        let first = store.query("payments", Query::new()).await.unwrap();
        let second = store.query("payments", Query::new()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_newest_first_with_paging() {
        let store = seeded().await;
        let all = store
            .query("payments", Query::new().order(Order::OldestFirst))
            .await
            .unwrap();
        let newest = store
            .query(
                "payments",
                Query::new().order(Order::NewestFirst).offset(1).limit(2),
            )
            .await
            .unwrap();

        assert_eq!(newest.len(), 2);
        assert_eq!(newest[0].id, all[2].id);
        assert_eq!(newest[1].id, all[1].id);
    }

    #[tokio::test]
    async fn test_replace_if_checks_expected_fields() {
        let store = MemoryDocumentStore::new();
        store
            .set("sessions", "s1", fields([("revision", json!(0)), ("count", json!(0))]))
            .await
            .unwrap();

        let next = fields([("revision", json!(1)), ("count", json!(1))]);
        assert!(store
            .replace_if("sessions", "s1", fields([("revision", json!(0))]), next.clone())
            .await
            .unwrap());
        // The revision moved on, so a second writer holding revision 0 loses
        assert!(!store
            .replace_if("sessions", "s1", fields([("revision", json!(0))]), next)
            .await
            .unwrap());
        assert!(!store
            .replace_if("sessions", "missing", Fields::new(), Fields::new())
            .await
            .unwrap());

        let stored = store.get("sessions", "s1").await.unwrap().unwrap();
        assert_eq!(stored.fields["count"], 1);
    }

    #[tokio::test]
    async fn test_set_update_delete() {
        let store = MemoryDocumentStore::new();
        let created = store
            .set("favorites", "u_i", fields([("userId", json!("u"))]))
            .await
            .unwrap();
        let replaced = store
            .set("favorites", "u_i", fields([("userId", json!("u")), ("imageId", json!("i"))]))
            .await
            .unwrap();
        assert_eq!(replaced.created_at, created.created_at);
        assert_eq!(store.count("favorites", Query::new()).await.unwrap(), 1);

        let updated = store
            .update("favorites", "u_i", fields([("imageId", json!("j"))]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.fields["imageId"], "j");
        assert_eq!(updated.fields["userId"], "u");

        assert!(store.update("favorites", "missing", Fields::new()).await.unwrap().is_none());
        assert!(store.delete("favorites", "u_i").await.unwrap());
        assert!(!store.delete("favorites", "u_i").await.unwrap());
        assert_ok!(store.ping().await);
    }
}
