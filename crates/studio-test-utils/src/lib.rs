//! Testing utilities for the Algo Studio workspace
//!
//! Shared record fixtures and collaborator doubles.

#![allow(missing_docs)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use studio_core::{GenerateError, Generator, MemoryStore, RecordStore, StoreError};
use studio_matrix::{ApproachKey, CodeBlock, ImplementationMatrix, Language, LanguageRow};
use studio_record::{Record, RecordLoader, LEGACY_FIELDS};

pub fn block(approach: &str, code: &str) -> CodeBlock {
    CodeBlock::empty(ApproachKey::from(approach)).with_code(code)
}

pub fn row(language: &str, blocks: impl IntoIterator<Item = CodeBlock>) -> LanguageRow {
    blocks
        .into_iter()
        .fold(LanguageRow::new(Language::new(language)), LanguageRow::with_block)
}

/// TypeScript `[optimize, starter]`, Python `[optimize]`
pub fn sample_matrix() -> ImplementationMatrix {
    ImplementationMatrix::from_rows([
        row("TypeScript", [block("optimize", "X"), block("starter", "Z")]),
        row("Python", [block("optimize", "P")]),
    ])
}

pub fn two_sum_json() -> Value {
    json!({
        "id": "two-sum",
        "name": "Two Sum",
        "title": "Two Sum",
        "category": "arrays",
        "difficulty": "easy",
        "serial_no": 1,
        "description": "Find two indices whose values add up to a target.",
        "metadata": {
            "companyTags": ["Acme"],
            "likes": 0,
            "timeComplexity": "O(n)",
            "spaceComplexity": "O(n)",
            "overview": "Hash map lookup of complements."
        },
        "explanation": {
            "problemStatement": "Given nums and target, return indices i, j with nums[i] + nums[j] = target.",
            "steps": ["Walk the array", "Look up target - x"],
            "tips": ["Store indices, not values"]
        },
        "implementations": [
            {"lang": "TypeScript", "code": [
                {"codeType": "optimize", "code": "X", "explanationBefore": "Use a map"},
                {"codeType": "starter", "code": "Z"}
            ]},
            {"lang": "Python", "code": [
                {"codeType": "optimize", "code": "P", "explanationBefore": "Use a map"}
            ]}
        ],
        "tutorials": [{"title": "Hashing", "url": "https://example.com/hashing"}],
        "problems_to_solve": {"internal": [], "external": []}
    })
}

pub fn two_sum_record() -> Record {
    RecordLoader::new().load_value(two_sum_json()).unwrap()
}

/// Re-encode every structured legacy field as a JSON string
pub fn legacy_encoded(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        for field in LEGACY_FIELDS {
            if let Some(nested) = map.get_mut(*field) {
                if !nested.is_string() {
                    *nested = Value::String(nested.to_string());
                }
            }
        }
    }
    value
}

/// Generator returning a fixed payload
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    payload: Result<Value, String>,
}

impl CannedGenerator {
    pub fn returning(payload: Value) -> Self {
        Self { payload: Ok(payload) }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            payload: Err(reason.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _topic: &str) -> Result<Value, GenerateError> {
        self.payload.clone().map_err(GenerateError::Unavailable)
    }
}

/// Memory store whose first `failures` writes fail as unavailable
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn failing(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn trip(&self) -> Result<(), StoreError> {
        let tripped = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for FlakyStore {
    async fn create(&self, record: &Record) -> Result<Record, StoreError> {
        self.trip()?;
        self.inner.create(record).await
    }

    async fn update(&self, id: &str, record: &Record) -> Result<Record, StoreError> {
        self.trip()?;
        self.inner.update(id, record).await
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        self.inner.get(id).await
    }
}
