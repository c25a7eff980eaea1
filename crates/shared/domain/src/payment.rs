//! Payment records as exposed to administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{FIELD_CREATED_AT, FIELD_ID, FIELD_PAYMENT_METHOD, FIELD_STATUS};
use crate::document::{Document, Fields};
use crate::timestamp::normalize_timestamp;

/// A payment document with its identifier and a normalized `createdAt`.
///
/// All other stored fields are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl PaymentRecord {
    /// Map a stored document, defaulting a missing timestamp to `now`.
    pub fn from_document(document: Document, now: DateTime<Utc>) -> Self {
        let mut fields = document.fields;
        let created_at = normalize_timestamp(fields.remove(FIELD_CREATED_AT).as_ref(), now);
        fields.remove(FIELD_ID);

        Self {
            id: document.id,
            created_at,
            fields,
        }
    }

    /// Stored payment status
    pub fn status(&self) -> Option<&str> {
        self.fields.get(FIELD_STATUS).and_then(|v| v.as_str())
    }

    /// Stored payment method
    pub fn payment_method(&self) -> Option<&str> {
        self.fields.get(FIELD_PAYMENT_METHOD).and_then(|v| v.as_str())
    }
}
