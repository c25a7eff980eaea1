//! Normalization of stored timestamp representations.
//!
//! Documents written by different clients carry timestamps as serialized
//! backend timestamps (`{_seconds, _nanoseconds}` or `{seconds, nanoseconds}`),
//! RFC 3339 strings, or epoch milliseconds.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parse any supported timestamp representation.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .filter(|f| f.abs() <= i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => {
            let seconds = map
                .get("_seconds")
                .or_else(|| map.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("_nanoseconds")
                .or_else(|| map.get("nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

/// Parse a timestamp, falling back to `now` when absent or unparseable.
pub fn normalize_timestamp(value: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    value.and_then(parse_timestamp).unwrap_or(now)
}
