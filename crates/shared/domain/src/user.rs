//! Account records as exposed to administrators.

use serde::{Deserialize, Serialize};

use crate::constants::{FIELD_EMAIL, FIELD_ID};
use crate::document::{Document, Fields};

/// A user document: its identifier merged with its stored fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl UserRecord {
    /// Stored email address
    pub fn email(&self) -> Option<&str> {
        self.fields.get(FIELD_EMAIL).and_then(|v| v.as_str())
    }
}

impl From<Document> for UserRecord {
    fn from(document: Document) -> Self {
        let mut fields = document.fields;
        fields.remove(FIELD_ID);
        Self {
            id: document.id,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fields;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_user_record_serializes_flat() {
        let now = Utc::now();
        let record = UserRecord::from(Document {
            id: "user-1".to_string(),
            fields: fields([
                ("email", json!("ada@example.com")),
                ("displayName", json!("Ada")),
                ("credits", json!(12)),
            ]),
            created_at: now,
            updated_at: now,
        });

        assert_eq!(record.email(), Some("ada@example.com"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "user-1",
                "email": "ada@example.com",
                "displayName": "Ada",
                "credits": 12
            })
        );
    }
}
