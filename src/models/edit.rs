//! Edit record decoded from one row of the recent changes feed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of change reported by the feed (`type` in the API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeType {
    Edit,
    New,
    Log,
    Categorize,
    External,
    /// Anything the API adds later; kept verbatim.
    Other(String),
}

impl ChangeType {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::Edit => "edit",
            ChangeType::New => "new",
            ChangeType::Log => "log",
            ChangeType::Categorize => "categorize",
            ChangeType::External => "external",
            ChangeType::Other(s) => s,
        }
    }
}

impl From<String> for ChangeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "edit" => ChangeType::Edit,
            "new" => ChangeType::New,
            "log" => ChangeType::Log,
            "categorize" => ChangeType::Categorize,
            "external" => ChangeType::External,
            _ => ChangeType::Other(s),
        }
    }
}

impl From<ChangeType> for String {
    fn from(kind: ChangeType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the edit history.
///
/// Every column the API may omit is optional; the boolean flags default to
/// `false` because the API only sends them when they are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    pub change_type: Option<ChangeType>,
    pub namespace: Option<i64>,
    pub title: Option<String>,
    pub user: Option<String>,
    pub user_id: Option<i64>,
    pub is_bot: bool,
    pub old_length: Option<i64>,
    pub new_length: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub is_minor: bool,
    pub is_anonymous: bool,
    pub is_new: bool,
}

impl EditRecord {
    /// Decode a raw feed row.
    ///
    /// Returns `None` only when the row is not a JSON object at all. Missing or
    /// mistyped fields become `None` in their column.
    pub fn from_value(row: &Value) -> Option<Self> {
        let fields = row.as_object()?;

        Some(Self {
            change_type: string_field(fields, "type").map(ChangeType::from),
            namespace: int_field(fields, "ns"),
            title: string_field(fields, "title"),
            user: string_field(fields, "user"),
            user_id: int_field(fields, "userid"),
            is_bot: flag(fields, "bot"),
            old_length: int_field(fields, "oldlen"),
            new_length: int_field(fields, "newlen"),
            timestamp: string_field(fields, "timestamp").and_then(|raw| parse_timestamp(&raw)),
            comment: string_field(fields, "comment"),
            is_minor: flag(fields, "minor"),
            is_anonymous: flag(fields, "anon"),
            is_new: flag(fields, "new"),
        })
    }

    /// Timestamp as a naive UTC literal for the store (`YYYY-MM-DD HH:MM:SS`).
    pub fn naive_timestamp(&self) -> Option<String> {
        self.timestamp
            .map(|ts| ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.as_str().map(str::to_string)
}

fn int_field(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// formatversion=1 sends `"bot": ""` for set flags and omits unset ones;
// formatversion=2 sends real booleans.
fn flag(fields: &Map<String, Value>, key: &str) -> bool {
    match fields.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn decodes_full_row() {
        let row = json!({
            "type": "edit",
            "ns": 0,
            "title": "Halloween",
            "user": "Example",
            "userid": 1234,
            "bot": "",
            "minor": "",
            "oldlen": 100,
            "newlen": 120,
            "timestamp": "2024-10-31T00:00:05Z",
            "comment": "fix typo"
        });

        let record = EditRecord::from_value(&row).unwrap();
        assert_eq!(record.change_type, Some(ChangeType::Edit));
        assert_eq!(record.namespace, Some(0));
        assert_eq!(record.title.as_deref(), Some("Halloween"));
        assert_eq!(record.user_id, Some(1234));
        assert!(record.is_bot);
        assert!(record.is_minor);
        assert!(!record.is_anonymous);
        assert!(!record.is_new);
        assert_eq!(record.new_length, Some(120));
        assert_eq!(
            record.timestamp,
            Some(Utc.with_ymd_and_hms(2024, 10, 31, 0, 0, 5).unwrap())
        );
        assert_eq!(
            record.naive_timestamp().as_deref(),
            Some("2024-10-31 00:00:05")
        );
    }

    #[test]
    fn missing_userid_becomes_none() {
        let row = json!({
            "type": "new",
            "title": "Draft:Example",
            "user": "192.0.2.1",
            "anon": "",
            "timestamp": "2024-10-31T12:00:00Z"
        });

        let record = EditRecord::from_value(&row).unwrap();
        assert_eq!(record.user_id, None);
        assert_eq!(record.comment, None);
        assert!(record.is_anonymous);
    }

    #[test]
    fn accepts_formatversion_two_booleans() {
        let row = json!({ "type": "log", "bot": true, "minor": false });
        let record = EditRecord::from_value(&row).unwrap();
        assert!(record.is_bot);
        assert!(!record.is_minor);
    }

    #[test]
    fn bad_timestamp_is_null_not_fatal() {
        let row = json!({ "type": "edit", "timestamp": "yesterday" });
        let record = EditRecord::from_value(&row).unwrap();
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn non_object_rows_are_rejected() {
        assert!(EditRecord::from_value(&json!("edit")).is_none());
        assert!(EditRecord::from_value(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn unknown_change_type_is_kept() {
        let kind = ChangeType::from("flow".to_string());
        assert_eq!(kind, ChangeType::Other("flow".to_string()));
        assert_eq!(kind.as_str(), "flow");
    }
}
