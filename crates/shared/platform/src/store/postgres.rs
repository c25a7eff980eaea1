//! PostgreSQL document store.
//!
//! Every document is a JSONB row keyed by `(collection, id)`. Equality
//! predicates are sent as one containment test (`data @> {...}`) so a single
//! GIN index serves any combination of filtered fields.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use serde_json::Value;
use tracing::debug;

use common::AppResult;
use domain::{Document, Fields};

use super::entities::document::{self, ActiveModel, Entity as DocumentEntity};
use super::{DocumentStore, Order, Query};
use crate::infra::Database;

/// Document store backed by the `documents` table.
pub struct PgDocumentStore {
    db: Database,
}

impl PgDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn select(collection: &str, query: &Query) -> Select<DocumentEntity> {
        let mut select =
            DocumentEntity::find().filter(document::Column::Collection.eq(collection));

        if !query.filters.is_empty() {
            select = select.filter(Expr::cust_with_values(
                "data @> ?",
                [Value::Object(query.filters.clone())],
            ));
        }

        select
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        DocumentEntity::find_by_id((collection.to_string(), id.to_string()))
            .one(self.db.connection())
            .await?
            .map(Document::try_from)
            .transpose()
    }

    async fn query(&self, collection: &str, query: Query) -> AppResult<Vec<Document>> {
        debug!(collection, filters = ?query.filters, "Querying documents");

        let mut select = Self::select(collection, &query);

        select = match query.order {
            Some(Order::NewestFirst) => select.order_by_desc(document::Column::CreatedAt),
            Some(Order::OldestFirst) => select.order_by_asc(document::Column::CreatedAt),
            None => select,
        };
        if let Some(offset) = query.offset {
            select = select.offset(offset);
        }
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
            .all(self.db.connection())
            .await?
            .into_iter()
            .map(Document::try_from)
            .collect()
    }

    async fn count(&self, collection: &str, query: Query) -> AppResult<u64> {
        Ok(Self::select(collection, &query)
            .count(self.db.connection())
            .await?)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> AppResult<Document> {
        let now = Utc::now();
        let model = ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(Document::new_id()),
            data: Set(Value::Object(fields)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.connection())
        .await?;

        Document::try_from(model)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> AppResult<Document> {
        let now = Utc::now();
        let active = ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.to_string()),
            data: Set(Value::Object(fields)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = DocumentEntity::insert(active)
            .on_conflict(
                OnConflict::columns([document::Column::Collection, document::Column::Id])
                    .update_columns([document::Column::Data, document::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_with_returning(self.db.connection())
            .await?;

        Document::try_from(model)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> AppResult<Option<Document>> {
        let Some(model) = DocumentEntity::find_by_id((collection.to_string(), id.to_string()))
            .one(self.db.connection())
            .await?
        else {
            return Ok(None);
        };

        let mut fields = Document::try_from(model.clone())?.fields;
        fields.extend(patch);

        let mut active: ActiveModel = model.into();
        active.data = Set(Value::Object(fields));
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db.connection()).await?;
        Document::try_from(model).map(Some)
    }

    async fn replace_if(
        &self,
        collection: &str,
        id: &str,
        expected: Fields,
        fields: Fields,
    ) -> AppResult<bool> {
        // Single UPDATE: the row lock makes the containment check and the write atomic
        let result = DocumentEntity::update_many()
            .col_expr(document::Column::Data, Expr::value(Value::Object(fields)))
            .col_expr(document::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(document::Column::Collection.eq(collection))
            .filter(document::Column::Id.eq(id))
            .filter(Expr::cust_with_values(
                "data @> ?",
                [Value::Object(expected)],
            ))
            .exec(self.db.connection())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        let result = DocumentEntity::delete_by_id((collection.to_string(), id.to_string()))
            .exec(self.db.connection())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(self.db.ping().await?)
    }
}
