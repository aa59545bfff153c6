//! Emptiness rules for protected fields
//!
//! A protected field keeps its existing value only when that value is
//! "present"; what counts as present depends on the field's type.

use serde_json::Value;

/// Whether a field value counts as curator-entered content
pub trait Presence {
    /// `true` when the value should be protected from overwrite
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// Counters: zero is a real value
impl Presence for Option<u64> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl Presence for Option<String> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(|text| text.is_present())
    }
}

/// Free-form JSON: arrays and objects are present when any nested element is
impl Presence for Value {
    fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(_) | Value::Number(_) => true,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => map.values().any(Presence::is_present),
        }
    }
}

/// Truthiness of a JSON value (`null`, `false`, `0`, `""` are falsy)
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
