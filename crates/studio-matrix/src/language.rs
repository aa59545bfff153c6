//! Language identities for matrix rows
//!
//! Provides [`Language`] (canonical key + display label) and [`LanguageTable`],
//! the canonicalisation table that maps lowercase keys back to display casing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Built-in canonical labels, keyed by canonical key
const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("typescript", "TypeScript"),
    ("javascript", "JavaScript"),
    ("python", "Python"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c", "C"),
    ("csharp", "C#"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("kotlin", "Kotlin"),
    ("swift", "Swift"),
    ("ruby", "Ruby"),
];

/// Spellings folded onto a canonical key
const KEY_ALIASES: &[(&str, &str)] = &[
    ("c++", "cpp"),
    ("c#", "csharp"),
    ("ts", "typescript"),
    ("js", "javascript"),
    ("py", "python"),
    ("golang", "go"),
];

/// Target programming language of a matrix row
///
/// Identity is the canonical `key` (lowercase, aliases folded). The `label`
/// is what curators see and what is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Language {
    key: String,
    label: String,
}

impl Language {
    /// Create language from a curator-supplied label using the built-in table
    #[must_use]
    pub fn new(label: impl AsRef<str>) -> Self {
        LanguageTable::builtin().language(label.as_ref())
    }

    /// Canonical key for an arbitrary spelling
    ///
    /// # Examples
    /// - `"TypeScript"` → `typescript`
    /// - `"C++"` → `cpp`
    #[must_use]
    pub fn key_of(label: &str) -> String {
        let lowered = label.trim().to_lowercase();
        KEY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map_or(lowered, |(_, key)| (*key).to_string())
    }

    /// Canonical key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check whether `other` names this language (case-insensitive)
    #[inline]
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.key == Self::key_of(other)
    }

    /// Check if the language has no identity (blank label)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl From<&str> for Language {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::new(label))
    }
}

/// Canonicalisation table: canonical key → display label
///
/// Unknown languages keep the label they were introduced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    labels: BTreeMap<String, String>,
}

impl LanguageTable {
    /// Table with the built-in entries only
    #[must_use]
    pub fn builtin() -> Self {
        let labels = BUILTIN_LABELS
            .iter()
            .map(|(key, label)| ((*key).to_string(), (*label).to_string()))
            .collect();
        Self { labels }
    }

    /// Add or replace an entry
    pub fn insert(&mut self, spelling: &str, label: impl Into<String>) {
        let key = Language::key_of(spelling);
        if !key.is_empty() {
            self.labels.insert(key, label.into());
        }
    }

    /// Extend with several entries
    #[must_use]
    pub fn with_entries<'a>(mut self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (spelling, label) in entries {
            self.insert(spelling, label);
        }
        self
    }

    /// Canonical label for a key, if the table knows it
    #[inline]
    #[must_use]
    pub fn canonical(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Resolve a curator-supplied label into a [`Language`]
    #[must_use]
    pub fn language(&self, label: &str) -> Language {
        let key = Language::key_of(label);
        let label = self
            .canonical(&key)
            .map_or_else(|| label.trim().to_string(), str::to_string);
        Language { key, label }
    }

    /// Re-apply canonical casing to an existing language
    #[must_use]
    pub fn recanonicalize(&self, language: &Language) -> Language {
        match self.canonical(language.key()) {
            Some(label) => Language {
                key: language.key.clone(),
                label: label.to_string(),
            },
            None => language.clone(),
        }
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_gets_canonical_label() {
        let lang = Language::new("typescript");
        assert_eq!(lang.key(), "typescript");
        assert_eq!(lang.label(), "TypeScript");
    }

    #[test]
    fn unknown_language_keeps_label() {
        let lang = Language::new("  Elixir ");
        assert_eq!(lang.key(), "elixir");
        assert_eq!(lang.label(), "Elixir");
    }

    #[test]
    fn aliases_fold_to_one_key() {
        assert_eq!(Language::new("C++"), Language::new("cpp"));
        assert_eq!(Language::new("c#").label(), "C#");
    }

    #[test]
    fn matches_is_case_insensitive() {
        let lang = Language::new("Python");
        assert!(lang.matches("PYTHON"));
        assert!(!lang.matches("java"));
    }

    #[test]
    fn table_extension_overrides_label() {
        let table = LanguageTable::builtin().with_entries([("ocaml", "OCaml")]);
        assert_eq!(table.language("ocaml").label(), "OCaml");
        assert_eq!(table.recanonicalize(&Language::new("ocaml")).label(), "OCaml");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Language::new("java")).unwrap();
        assert_eq!(json, "\"Java\"");

        let back: Language = serde_json::from_str("\"typescript\"").unwrap();
        assert_eq!(back.label(), "TypeScript");
    }
}
