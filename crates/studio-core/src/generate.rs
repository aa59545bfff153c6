//! Generation collaborator
//!
//! A [`Generator`] turns a topic into a record-shaped JSON payload. The
//! payload is only ever a merge candidate; the session never applies it on
//! its own.

use serde_json::Value;
use studio_record::RecordError;

/// Generation collaborator
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Produce a record-shaped payload for `topic`
    async fn generate(&self, topic: &str) -> Result<Value, GenerateError>;
}

/// Generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Blank topic
    #[error("generation topic is blank")]
    EmptyTopic,

    /// Service unreachable or refused the request
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// Service did not answer in time
    #[error("generation timed out after {secs}s")]
    Timeout {
        /// Elapsed seconds
        secs: u64,
    },

    /// Payload is not record-shaped
    #[error("generated payload rejected: {0}")]
    Payload(#[from] RecordError),
}

impl GenerateError {
    /// Check if asking again may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable() {
        assert!(GenerateError::Timeout { secs: 30 }.is_retryable());
        assert!(!GenerateError::EmptyTopic.is_retryable());
        assert!(!GenerateError::Payload(RecordError::ImportEmpty).is_retryable());
    }
}
