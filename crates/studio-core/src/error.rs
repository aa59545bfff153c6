//! Error types for the edit session
//!
//! [`SessionError`] aggregates the errors of every layer a session touches.

use crate::config::ConfigError;
use crate::generate::GenerateError;
use crate::store::StoreError;
use studio_matrix::MatrixError;
use studio_merge::MergeError;
use studio_record::RecordError;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Record text or payload rejected, or save-time validation failed
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Matrix edit rejected
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Merge configuration invalid
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    /// Persistence collaborator failed
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// Generation collaborator failed
    #[error("generation failed: {0}")]
    Generation(#[from] GenerateError),

    /// Record id edited after the record was first saved
    #[error("record id changed from {persisted:?} to {current:?}; the id is fixed once saved")]
    IdChanged {
        /// Id the record was saved under
        persisted: String,
        /// Id currently on the record
        current: String,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(e) => e.is_retryable(),
            Self::Generation(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Check if error is the save-time identity check
    #[inline]
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Record(RecordError::MissingIdentity { .. }))
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
