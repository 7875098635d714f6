//! Wire shape of the documents kept in the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document written for every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub payload: Value,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn wrap(payload: Value) -> Self {
        Self {
            payload,
            updated_at: Utc::now(),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({
            "payload": self.payload,
            "updatedAt": self.updated_at,
        })
    }
}

/// Extract the logical value from a stored document.
///
/// Checks the legacy `items` field first, then `payload`, and falls back to
/// the raw document when neither is set.
pub fn unwrap_document(document: Value) -> Value {
    match document {
        Value::Object(mut fields) => {
            if let Some(items) = fields.remove("items").filter(is_truthy) {
                return items;
            }
            if let Some(payload) = fields.remove("payload").filter(is_truthy) {
                return payload;
            }
            Value::Object(fields)
        }
        other => other,
    }
}

/// Loose truthiness used on stored values: `null`, `false`, `0` and `""`
/// are falsy; every array and object is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_prefers_legacy_items() {
        let doc = json!({ "items": [1, 2], "payload": [3] });
        assert_eq!(unwrap_document(doc), json!([1, 2]));
    }

    #[test]
    fn test_unwrap_payload() {
        let doc = json!({ "payload": { "aboutTitle": "Hi" }, "updatedAt": "2026-01-01T00:00:00Z" });
        assert_eq!(unwrap_document(doc), json!({ "aboutTitle": "Hi" }));
    }

    #[test]
    fn test_unwrap_empty_list_is_kept() {
        let doc = json!({ "payload": [] });
        assert_eq!(unwrap_document(doc), json!([]));
    }

    #[test]
    fn test_unwrap_raw_document() {
        let doc = json!({ "homeHeroTitle": "Raw" });
        assert_eq!(unwrap_document(doc), json!({ "homeHeroTitle": "Raw" }));
    }

    #[test]
    fn test_stored_document_shape() {
        let value = StoredDocument::wrap(json!([{ "id": 1 }])).into_value();
        assert_eq!(value["payload"], json!([{ "id": 1 }]));
        assert!(value["updatedAt"].is_string());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
