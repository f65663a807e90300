//! Revision Records
//!
//! Transient records decoded from the Action API. Created while a collector
//! runs and discarded when it returns.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// One revision of a page, as listed by `prop=revisions` (formatversion 2)
#[derive(Debug, Clone)]
pub struct Revision {
    pub id: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub user: Option<String>,
    /// Set when the author was an anonymous IP
    pub anon: bool,
    pub minor: bool,
    /// Page size in bytes after this revision
    pub size: Option<i64>,
    pub comment: Option<String>,
}

impl Revision {
    /// Decode a single revision object; tolerates absent props (the caller
    /// controls `rvprop` and only reads what it asked for).
    pub fn from_json(value: &Value) -> Self {
        Self {
            id: value.get("revid").and_then(Value::as_u64).unwrap_or(0),
            timestamp: value
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            user: value
                .get("user")
                .and_then(Value::as_str)
                .map(str::to_string),
            anon: flag(value, "anon"),
            minor: flag(value, "minor"),
            size: value.get("size").and_then(Value::as_i64),
            comment: value
                .get("comment")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// One entry of a user's contribution history (`list=usercontribs`)
#[derive(Debug, Clone)]
pub struct UserContrib {
    pub timestamp: Option<DateTime<Utc>>,
    /// Signed byte delta of the edit (`ucprop=sizediff`)
    pub size_diff: Option<i64>,
}

impl UserContrib {
    pub fn from_json(value: &Value) -> Self {
        Self {
            timestamp: value
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            size_diff: value.get("sizediff").and_then(Value::as_i64),
        }
    }
}

/// An edit-protection entry from `inprop=protection`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionEntry {
    pub protection_type: String,
    pub level: String,
}

/// Parse a MediaWiki ISO-8601 timestamp (`2024-06-01T12:00:00Z`)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Boolean flags arrive either as `true` (formatversion 2) or as an empty
/// string (formatversion 1); treat bare presence as set.
fn flag(value: &Value, name: &str) -> bool {
    match value.get(name) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_revision_full_decode() {
        let rev = Revision::from_json(&json!({
            "revid": 123456,
            "timestamp": "2024-03-15T08:30:00Z",
            "user": "Alice",
            "minor": true,
            "size": 2048,
            "comment": "copyedit"
        }));
        assert_eq!(rev.id, 123456);
        assert_eq!(rev.user.as_deref(), Some("Alice"));
        assert!(rev.minor);
        assert!(!rev.anon);
        assert_eq!(rev.size, Some(2048));
        assert_eq!(
            rev.timestamp.unwrap().to_rfc3339(),
            "2024-03-15T08:30:00+00:00"
        );
    }

    #[test]
    fn test_revision_anon_flag() {
        let rev = Revision::from_json(&json!({
            "revid": 1,
            "user": "192.0.2.17",
            "anon": true
        }));
        assert!(rev.anon);
    }

    #[test]
    fn test_revision_sparse_props() {
        let rev = Revision::from_json(&json!({ "user": "Bob" }));
        assert_eq!(rev.id, 0);
        assert!(rev.timestamp.is_none());
        assert!(rev.size.is_none());
    }

    #[test]
    fn test_contrib_decode() {
        let c = UserContrib::from_json(&json!({
            "timestamp": "2023-01-01T00:00:00Z",
            "sizediff": -120
        }));
        assert_eq!(c.size_diff, Some(-120));
        assert!(c.timestamp.is_some());
    }

    #[test]
    fn test_bad_timestamp_is_none() {
        assert!(parse_timestamp("not-a-date").is_none());
    }
}
