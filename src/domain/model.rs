use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sentinel status written when the line items of one document disagree.
/// Callers must not filter or sort a document carrying it as if it had a
/// single authoritative status.
pub const MIXED_STATUS: &str = "Mixed Status";

pub type DocumentKey = String;

/// One line-item record as delivered by the remote source. The document key
/// is extracted up front (the key field name is view configuration); all
/// fields, the key field included, stay in an ordered map so every
/// derivation over the record is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub document_key: Option<DocumentKey>,
    pub fields: BTreeMap<String, Value>,
}

impl RawRecord {
    pub fn from_object(key_field: &str, obj: serde_json::Map<String, Value>) -> Self {
        let fields: BTreeMap<String, Value> = obj.into_iter().collect();
        let document_key = fields.get(key_field).and_then(|v| {
            let text = value_text(v);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        });
        Self {
            document_key,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Text rendering of a field, empty string when absent or null.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).map(value_text).unwrap_or_default()
    }
}

/// The normalized result of one page fetch.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<RawRecord>,
    /// `hasNextPage` when the server sent one; `None` means the caller
    /// infers continuation from the record count.
    pub explicit_has_more: Option<bool>,
}

/// Identity of one record inside the working set. Derived purely from page
/// content and position so a retried page regenerates the same identities
/// and accumulation stays idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordIdentity {
    /// `line` is the record's ordinal among same-key records within its page.
    Keyed {
        page: u32,
        key: DocumentKey,
        line: u32,
    },
    /// Records without a usable document key dedup positionally and never
    /// participate in grouping.
    Unkeyed { page: u32, row: u32 },
}

/// One merged view of all line items sharing a document key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedRecord {
    pub document_key: DocumentKey,
    pub fields: BTreeMap<String, Value>,
    /// Number of raw records grouped into this document.
    pub source_count: usize,
}

impl ConsolidatedRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).map(value_text).unwrap_or_default()
    }
}

/// Mutation response envelope. `success` is the literal string
/// `"true"`/`"false"` on the wire, never a boolean.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: String,
}

impl MutationResponse {
    pub fn succeeded(&self) -> bool {
        self.success == "true"
    }
}

/// Canonical text rendering of a JSON field value. Strings are trimmed;
/// null renders empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_document_key_extracted_from_configured_field() {
        let record = RawRecord::from_object(
            "Document Number",
            object(json!({"Document Number": "EQJOB62", "Equipment": "Main spring"})),
        );
        assert_eq!(record.document_key.as_deref(), Some("EQJOB62"));
        assert_eq!(record.text("Equipment"), "Main spring");
    }

    #[test]
    fn test_blank_or_null_key_means_unkeyed() {
        let blank = RawRecord::from_object(
            "Document Number",
            object(json!({"Document Number": "   ", "Equipment": "Battery"})),
        );
        assert_eq!(blank.document_key, None);

        let null = RawRecord::from_object(
            "Document Number",
            object(json!({"Document Number": null})),
        );
        assert_eq!(null.document_key, None);

        let missing = RawRecord::from_object("Document Number", object(json!({"Other": 1})));
        assert_eq!(missing.document_key, None);
    }

    #[test]
    fn test_numeric_key_renders_as_text() {
        let record =
            RawRecord::from_object("Document Number", object(json!({"Document Number": 4217})));
        assert_eq!(record.document_key.as_deref(), Some("4217"));
    }

    #[test]
    fn test_mutation_success_is_string_comparison() {
        let ok: MutationResponse =
            serde_json::from_value(json!({"message": "created", "success": "true"})).unwrap();
        assert!(ok.succeeded());

        // "false" 是非空字串，不能用 truthiness 判斷
        let failed: MutationResponse =
            serde_json::from_value(json!({"message": "duplicate", "success": "false"})).unwrap();
        assert!(!failed.succeeded());

        let missing: MutationResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!missing.succeeded());
    }
}
