//! Algo Studio Protected Merge
//!
//! Merges an incoming payload (pasted or generated) into the record being
//! edited without silently discarding curator work.
//!
//! # Core Concepts
//!
//! - [`MergePolicy`]: per-field [`FieldRule`] table
//! - [`MatrixMerger`]: cell-level, all-or-nothing merge of implementations
//! - [`MergeEngine`]: applies the policy and returns a [`MergeReport`]
//!
//! # Example
//!
//! ```rust
//! use studio_merge::{Decision, Field, MergeEngine};
//! use studio_record::RecordLoader;
//!
//! let loader = RecordLoader::new();
//! let existing = loader.load_str(r#"{"title": "Two Sum", "metadata": {"overview": "old"}}"#).unwrap();
//! let incoming = loader.load_str(r#"{"title": "2Sum", "metadata": {"overview": "new"}}"#).unwrap();
//!
//! let outcome = MergeEngine::new().merge(&existing, &incoming);
//! assert_eq!(outcome.record.title, "Two Sum");
//! assert_eq!(outcome.record.metadata.overview.as_deref(), Some("new"));
//! assert_eq!(outcome.report.decision(Field::Title), Some(Decision::KeptExisting));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod implementations;
pub mod policy;
pub mod presence;
pub mod report;

// Re-exports
pub use engine::{MergeEngine, MergeOutcome};
pub use error::{MergeError, MergeResult};
pub use implementations::MatrixMerger;
pub use policy::{Field, FieldRule, MergePolicy};
pub use presence::{is_truthy, Presence};
pub use report::{
    CellRef, Decision, FieldDecision, ImplementationOutcome, ImplementationSummary, MergeReport,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
