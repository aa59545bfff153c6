//! Record loading
//!
//! Persisted records may carry nested fields as JSON-encoded strings (legacy
//! double encoding). [`RecordLoader`] performs the single pre-parse step at
//! this boundary so everything downstream sees structured values.

use crate::error::{RecordError, RecordResult};
use crate::record::Record;
use serde_json::Value;

/// Fields that may arrive double-encoded
pub const LEGACY_FIELDS: &[&str] = &[
    "explanation",
    "implementations",
    "test_cases",
    "input_schema",
    "problems_to_solve",
    "tutorials",
    "metadata",
];

/// Loader for persisted and pasted record JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLoader;

impl RecordLoader {
    /// Create new loader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse record text, decoding legacy fields
    ///
    /// # Errors
    /// - [`RecordError::Parse`] if `text` is not JSON
    /// - [`RecordError::LegacyField`] if a double-encoded field fails to parse
    /// - [`RecordError::NotAnObject`] / [`RecordError::Shape`] if the JSON is not record-shaped
    pub fn load_str(&self, text: &str) -> RecordResult<Record> {
        let value: Value = serde_json::from_str(text).map_err(RecordError::Parse)?;
        self.load_value(value)
    }

    /// Build a record from an already-parsed value, decoding legacy fields
    ///
    /// # Errors
    /// See [`load_str`](Self::load_str)
    pub fn load_value(&self, mut value: Value) -> RecordResult<Record> {
        self.decode_legacy(&mut value)?;
        serde_json::from_value(value).map_err(RecordError::Shape)
    }

    /// Replace string-encoded legacy fields with their parsed form, in place
    ///
    /// Blank strings become `null`. Returns the names of decoded fields.
    ///
    /// # Errors
    /// - [`RecordError::NotAnObject`] if `value` is not an object
    /// - [`RecordError::LegacyField`] if a field's string is not JSON
    pub fn decode_legacy(&self, value: &mut Value) -> RecordResult<Vec<&'static str>> {
        let Value::Object(map) = value else {
            return Err(RecordError::NotAnObject {
                found: json_type(value),
            });
        };

        let mut decoded = Vec::new();
        for &field in LEGACY_FIELDS {
            let Some(Value::String(encoded)) = map.get(field) else {
                continue;
            };

            let parsed = if encoded.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(encoded)
                    .map_err(|source| RecordError::LegacyField { field, source })?
            };
            map.insert(field.to_string(), parsed);
            decoded.push(field);
        }

        if !decoded.is_empty() {
            tracing::debug!(fields = ?decoded, "decoded legacy double-encoded fields");
        }
        Ok(decoded)
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_structured_record() {
        let record = RecordLoader::new()
            .load_str(r#"{"id": "bfs", "title": "BFS", "implementations": []}"#)
            .unwrap();
        assert_eq!(record.id, "bfs");
        assert!(record.implementations.is_empty());
    }

    #[test]
    fn decodes_double_encoded_fields() {
        let implementations = json!([{"lang": "java", "code": [{"codeType": "optimize", "code": "x"}]}]);
        let metadata = json!({"likes": 3});
        let value = json!({
            "id": "bfs",
            "implementations": implementations.to_string(),
            "metadata": metadata.to_string(),
            "tutorials": ""
        });

        let record = RecordLoader::new().load_value(value).unwrap();
        assert!(record.implementations.has_cell("Java", "optimize"));
        assert_eq!(record.metadata.likes, Some(3));
        assert!(record.tutorials.is_null());
    }

    #[test]
    fn reports_decoded_field_names() {
        let mut value = json!({"explanation": "{\"tips\": []}", "name": "{not decoded}"});
        let decoded = RecordLoader::new().decode_legacy(&mut value).unwrap();

        assert_eq!(decoded, vec!["explanation"]);
        assert_eq!(value["explanation"], json!({"tips": []}));
        assert_eq!(value["name"], "{not decoded}");
    }

    #[test]
    fn bad_legacy_field_is_parse_error() {
        let err = RecordLoader::new()
            .load_value(json!({"explanation": "{broken"}))
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::LegacyField {
                field: "explanation",
                ..
            }
        ));
        assert!(err.is_parse_error());
    }

    #[test]
    fn invalid_text_is_parse_error() {
        let err = RecordLoader::new().load_str("not json").unwrap_err();
        assert!(matches!(err, RecordError::Parse(_)));
    }

    #[test]
    fn non_object_rejected() {
        let err = RecordLoader::new().load_value(json!(42)).unwrap_err();
        assert!(matches!(err, RecordError::NotAnObject { found: "number" }));
    }
}
