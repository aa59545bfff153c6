//! Merge errors

use crate::policy::{Field, FieldRule};
use studio_matrix::ValidationReport;

/// Errors raised while merging
///
/// Shape errors inside incoming implementations never escape
/// [`MergeEngine::merge`](crate::MergeEngine::merge); they abort the
/// implementations merge only.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Incoming language row with a blank label
    #[error("incoming implementation row {index} has a blank language")]
    BlankLanguage {
        /// Row position in the incoming payload
        index: usize,
    },

    /// Incoming block with a blank approach key
    #[error("incoming {language} block {index} has a blank approach key")]
    BlankApproach {
        /// Language label of the row
        language: String,
        /// Block position within the row
        index: usize,
    },

    /// Merged matrix failed the consistency gate
    #[error("merged implementations are inconsistent: {0}")]
    Inconsistent(ValidationReport),

    /// Policy override names a rule the field cannot use
    #[error("rule '{rule}' cannot be applied to '{field}'")]
    InvalidOverride {
        /// Field being overridden
        field: Field,
        /// Requested rule
        rule: FieldRule,
    },

    /// Policy override names an unknown field
    #[error("unknown merge field: {0}")]
    UnknownField(String),
}

impl MergeError {
    /// Whether the error comes from the incoming payload rather than configuration
    #[must_use]
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::BlankLanguage { .. } | Self::BlankApproach { .. } | Self::Inconsistent(_)
        )
    }
}

/// Result type for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
