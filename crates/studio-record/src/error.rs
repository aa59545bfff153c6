//! Error types for record loading and import
//!
//! Covers:
//! - Parse failures (pasted text, legacy double-encoded fields)
//! - Empty array imports
//! - Save-time identity validation

/// Errors from loading, importing or validating a record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Input is not valid JSON
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Legacy double-encoded field failed its second parse
    #[error("legacy field '{field}' is not valid JSON: {source}")]
    LegacyField {
        /// Field name
        field: &'static str,
        /// Inner parse error
        #[source]
        source: serde_json::Error,
    },

    /// Imported JSON array has no elements
    #[error("import contains an empty array")]
    ImportEmpty,

    /// Top-level value is not an object
    #[error("expected a record object, found {found}")]
    NotAnObject {
        /// JSON type found instead
        found: &'static str,
    },

    /// Object does not fit the record shape
    #[error("record shape error: {0}")]
    Shape(#[source] serde_json::Error),

    /// Identity fields required at save time are blank
    #[error("missing required fields: {}", fields.join(", "))]
    MissingIdentity {
        /// Blank field names
        fields: Vec<&'static str>,
    },
}

impl RecordError {
    /// Check if error came from malformed input (as opposed to validation)
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::LegacyField { .. } | Self::NotAnObject { .. } | Self::Shape(_)
        )
    }
}

/// Result type alias for record operations
pub type RecordResult<T> = Result<T, RecordError>;
