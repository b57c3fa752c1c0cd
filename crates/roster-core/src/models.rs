//! Record model shared by the server, the store, and the client.
//!
//! A [`Record`] is one imported CSV row. Its field set is whatever the CSV
//! header declared; the store adds an identifier and timestamps on insert.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema-less field mapping for one row: column name → cell value.
pub type Fields = BTreeMap<String, String>;

/// Keys owned by the store. CSV columns with these names are dropped.
pub const RESERVED_FIELDS: [&str; 3] = ["_id", "createdAt", "updatedAt"];

/// A stored record.
///
/// Serializes flat, with the store-owned keys next to the row's own fields:
///
/// ```json
/// { "_id": "…", "createdAt": "2024-05-01T10:00:00.000Z", "updatedAt": "…", "email": "a@x.com" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "createdAt", with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Build a new record with a fresh UUID, stamped at `created_at`.
    ///
    /// Reserved keys are stripped from `fields` and the timestamp is
    /// truncated to millisecond precision, which is what gets persisted.
    pub fn new(mut fields: Fields, created_at: DateTime<Utc>) -> Self {
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }
        let created_at = truncate_millis(created_at);
        Self {
            id: Uuid::new_v4().to_string(),
            created_at,
            updated_at: created_at,
            fields,
        }
    }

    /// Value of `name`, or `""` when the row has no such column.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Drop sub-millisecond precision from a timestamp.
pub fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_new_strips_reserved_keys() {
        let rec = Record::new(
            fields(&[("_id", "spoofed"), ("createdAt", "x"), ("email", "a@x.com")]),
            Utc::now(),
        );
        assert_ne!(rec.id, "spoofed");
        assert_eq!(rec.fields.len(), 1);
        assert_eq!(rec.field("email"), "a@x.com");
    }

    #[test]
    fn test_absent_field_is_empty() {
        let rec = Record::new(fields(&[("first_name", "Ada")]), Utc::now());
        assert_eq!(rec.field("phone2"), "");
    }

    #[test]
    fn test_json_shape_is_flat() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T10:00:00.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let rec = Record::new(fields(&[("city", "Oslo")]), ts);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["city"], "Oslo");
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00.123Z");
        assert_eq!(json["_id"], rec.id.as_str());

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }
}
