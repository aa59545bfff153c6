//! Approach keys
//!
//! Provides [`ApproachKey`], the normalized identifier of a solution strategy
//! shared by every language row that implements it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

/// Approaches a first language row starts with
pub const DEFAULT_APPROACHES: &[&str] = &["optimize", "starter"];

/// Normalized approach identifier
///
/// Normalization lowercases and joins whitespace-separated words with hyphens,
/// so `"Brute Force"` and `"brute force"` both become `brute-force`.
///
/// # Invariants
/// - Normalizing an already-normalized key is a no-op
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ApproachKey(String);

impl ApproachKey {
    /// Normalize raw curator input into a key
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let words: Vec<_> = raw.split_whitespace().map(str::to_lowercase).collect();
        Self(words.join("-"))
    }

    /// Normalize, rejecting input that is blank after normalization
    #[inline]
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let key = Self::normalize(raw);
        (!key.is_empty()).then_some(key)
    }

    /// Key as stored
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if key is blank
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human display form: hyphens become spaces, words are capitalised
    ///
    /// `brute-force` → `Brute Force`
    #[must_use]
    pub fn display(&self) -> String {
        self.0
            .split('-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The built-in default approach set
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_APPROACHES.iter().map(|raw| Self::normalize(raw)).collect()
    }
}

impl Display for ApproachKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApproachKey {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl AsRef<str> for ApproachKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ApproachKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ApproachKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::normalize(&raw))
    }
}
