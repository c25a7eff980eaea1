//! Schema-less document as stored in a collection.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::FIELD_ID;
use crate::error::{DomainError, DomainResult};

/// Stored fields of a document.
pub type Fields = Map<String, Value>;

/// A document read from a collection.
///
/// `created_at` and `updated_at` are store metadata and never part of `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Generate a fresh document identifier.
    pub fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Raw value of a stored field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of a stored field
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Stored fields merged with the identifier.
    pub fn into_json(self) -> Fields {
        let mut fields = self.fields;
        fields.insert(FIELD_ID.to_string(), Value::String(self.id));
        fields
    }

    /// Decode into a typed entity whose `id` field receives the identifier.
    pub fn decode<T: DeserializeOwned>(self, entity: &str) -> DomainResult<T> {
        serde_json::from_value(Value::Object(self.into_json()))
            .map_err(|e| DomainError::malformed(entity, e.to_string()))
    }
}

/// Encode a typed entity into storable fields, dropping its `id`.
pub fn encode<T: Serialize>(entity: &str, value: &T) -> DomainResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut fields)) => {
            fields.remove(FIELD_ID);
            Ok(fields)
        }
        Ok(_) => Err(DomainError::malformed(entity, "expected a JSON object")),
        Err(e) => Err(DomainError::malformed(entity, e.to_string())),
    }
}

/// Build a field map from `(name, value)` pairs.
pub fn fields<I, K>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        id: String,
        user_id: String,
    }

    fn sample_document() -> Document {
        let now = Utc::now();
        Document {
            id: "doc-1".to_string(),
            fields: fields([("userId", json!("u-1"))]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_into_json_merges_id() {
        let json = sample_document().into_json();
        assert_eq!(json["id"], "doc-1");
        assert_eq!(json["userId"], "u-1");
    }

    #[test]
    fn test_decode_and_encode() {
        let sample: Sample = sample_document().decode("sample").unwrap();
        assert_eq!(sample.id, "doc-1");

        let encoded = encode("sample", &sample).unwrap();
        assert!(!encoded.contains_key("id"));
        assert_eq!(encoded["userId"], "u-1");
    }

    #[test]
    fn test_decode_reports_malformed() {
        let mut doc = sample_document();
        doc.fields.insert("userId".to_string(), json!(42));
        let err = doc.decode::<Sample>("sample").unwrap_err();
        assert!(matches!(err, DomainError::Malformed { .. }));
    }

    #[test]
    fn test_new_id_is_hex() {
        let id = Document::new_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
