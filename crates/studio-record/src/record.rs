//! Algorithm record model
//!
//! [`Record`] is the document being authored: identity scalars, [`Metadata`],
//! [`Explanation`], the implementation matrix, and free-form learning lists.
//! Unknown keys are kept in `extra` maps so nothing is dropped on a round trip.

use crate::error::{RecordError, RecordResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use studio_matrix::ImplementationMatrix;

/// Treat `null` as the type's default
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a serial number written as a number, a numeric string, or blank
fn serial_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid serial_no: {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid serial_no: {s}"))),
        Some(other) => Err(serde::de::Error::custom(format!("invalid serial_no: {other}"))),
    }
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

/// The enclosing algorithm document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier (slug)
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,

    /// Short name
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Display title
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,

    /// Category (e.g. "arrays")
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,

    /// Difficulty label
    #[serde(default, deserialize_with = "nullable")]
    pub difficulty: String,

    /// Position in the catalogue
    #[serde(default, deserialize_with = "serial_number", skip_serializing_if = "Option::is_none")]
    pub serial_no: Option<u64>,

    /// One-paragraph description
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    /// Complexity, tags, counters, long-form text
    #[serde(default, deserialize_with = "nullable")]
    pub metadata: Metadata,

    /// Problem statement, steps, tips, examples, constraints
    #[serde(default, deserialize_with = "nullable")]
    pub explanation: Explanation,

    /// Language × approach solution cells
    #[serde(default, deserialize_with = "nullable")]
    pub implementations: ImplementationMatrix,

    /// Tutorial links
    #[serde(default = "empty_array")]
    pub tutorials: Value,

    /// Practice problems (flat list or grouped lists)
    #[serde(default = "empty_array")]
    pub problems_to_solve: Value,

    /// Test cases for the playground
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub test_cases: Value,

    /// Input schema for the playground
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub input_schema: Value,

    /// Keys this model does not know
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Empty record used when a new edit session starts
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            title: String::new(),
            category: String::new(),
            difficulty: String::new(),
            serial_no: None,
            description: String::new(),
            metadata: Metadata::default(),
            explanation: Explanation::default(),
            implementations: ImplementationMatrix::new(),
            tutorials: empty_array(),
            problems_to_solve: empty_array(),
            test_cases: Value::Null,
            input_schema: Value::Null,
            extra: Map::new(),
        }
    }

    /// Verify identity fields required before saving
    ///
    /// # Errors
    /// [`RecordError::MissingIdentity`] naming every blank field among id, name, title
    pub fn check_identity(&self) -> RecordResult<()> {
        let fields: Vec<_> = [("id", &self.id), ("name", &self.name), ("title", &self.title)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(RecordError::MissingIdentity { fields })
        }
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if a nested value cannot be serialized
    pub fn to_json_pretty(&self) -> RecordResult<String> {
        serde_json::to_string_pretty(self).map_err(RecordError::Shape)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Record metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Companies known to ask the problem
    #[serde(default, deserialize_with = "nullable")]
    pub company_tags: Vec<String>,

    /// Like counter; `Some(0)` is a real value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,

    /// Dislike counter; `Some(0)` is a real value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<u64>,

    /// Big-O time
    #[serde(default, deserialize_with = "nullable")]
    pub time_complexity: String,

    /// Big-O space
    #[serde(default, deserialize_with = "nullable")]
    pub space_complexity: String,

    /// Long-form summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// Keys this model does not know
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Problem explanation
///
/// Kept as an ordered JSON object because merging is a shallow, per-key
/// operation and curators add sections freely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Explanation(Map<String, Value>);

impl Explanation {
    /// Key of the comparison table section
    pub const COMPARISON_TABLE: &'static str = "comparisonTable";

    /// Wrap an existing object
    #[inline]
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Underlying object
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying object
    #[inline]
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Section by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a section
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Check if there are no sections
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Problem statement text
    #[must_use]
    pub fn problem_statement(&self) -> Option<&str> {
        self.get("problemStatement").and_then(Value::as_str)
    }

    /// Solution steps
    #[must_use]
    pub fn steps(&self) -> &[Value] {
        self.list("steps")
    }

    /// Tips
    #[must_use]
    pub fn tips(&self) -> &[Value] {
        self.list("tips")
    }

    /// Input/output examples
    #[must_use]
    pub fn io_examples(&self) -> &[Value] {
        self.list("ioExamples")
    }

    /// Constraints
    #[must_use]
    pub fn constraints(&self) -> &[Value] {
        self.list("constraints")
    }

    fn list(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
