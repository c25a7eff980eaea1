//! Document row: one JSON document of one collection.

use sea_orm::entity::prelude::*;

use common::{AppError, AppResult};
use domain::{Document, DomainError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Stored fields (always a JSON object)
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a database row to a domain document
impl TryFrom<Model> for Document {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        match model.data {
            Json::Object(fields) => Ok(Document {
                id: model.id,
                fields,
                created_at: model.created_at,
                updated_at: model.updated_at,
            }),
            _ => Err(DomainError::malformed(
                format!("document {}/{}", model.collection, model.id),
                "stored data is not a JSON object",
            )
            .into()),
        }
    }
}
