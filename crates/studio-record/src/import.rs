//! Import surface for pasted or generated payloads
//!
//! Raw text is JSON-parsed; an array contributes only its first element.
//! Failures here are rejections: the edit session never sees them.

use crate::error::{RecordError, RecordResult};
use crate::loader::RecordLoader;
use crate::record::Record;
use serde_json::Value;

/// Parse pasted text into a record-shaped payload
///
/// # Errors
/// - [`RecordError::Parse`] if `text` is not JSON
/// - [`RecordError::ImportEmpty`] if `text` is an empty array
/// - [`RecordError::NotAnObject`] / [`RecordError::Shape`] if the payload is not record-shaped
pub fn parse_import(text: &str) -> RecordResult<Record> {
    let value: Value = serde_json::from_str(text).map_err(RecordError::Parse)?;
    import_value(value)
}

/// Accept an already-parsed payload (e.g. from a generator)
///
/// # Errors
/// See [`parse_import`]
pub fn import_value(value: Value) -> RecordResult<Record> {
    let payload = match value {
        Value::Array(items) => {
            let total = items.len();
            let first = items.into_iter().next().ok_or(RecordError::ImportEmpty)?;
            if total > 1 {
                tracing::info!(discarded = total - 1, "import array: using first element only");
            }
            first
        }
        other => other,
    };

    RecordLoader::new().load_value(payload)
}
