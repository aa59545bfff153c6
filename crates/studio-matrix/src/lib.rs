//! Algo Studio Implementation Matrix
//!
//! Sparse language × approach collection of solution code, edited through
//! pure broadcast transactions.
//!
//! # Core Concepts
//!
//! - [`ImplementationMatrix`]: language rows of [`CodeBlock`]s keyed by [`ApproachKey`]
//! - [`ApproachKeyRegistry`]: derived ordered union of approach keys (never stored)
//! - [`ConsistencyValidator`]: post-edit invariant checks gating every structural edit
//! - [`LanguageTable`]: canonical display casing for language keys
//!
//! # Example
//!
//! ```rust
//! use studio_matrix::{Direction, ImplementationMatrix, Language};
//!
//! let matrix = ImplementationMatrix::new()
//!     .add_language(Language::new("typescript"))
//!     .add_approach("Brute Force")
//!     .reorder_approach("brute-force", Direction::Left);
//!
//! let order: Vec<_> = matrix.approach_order().iter().map(|k| k.to_string()).collect();
//! assert_eq!(order, ["optimize", "brute-force", "starter"]);
//! assert!(matrix.has_cell("TypeScript", "brute force"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod approach;
mod block;
mod language;
mod matrix;
mod registry;
mod validation;

// Re-exports
pub use approach::{ApproachKey, DEFAULT_APPROACHES};
pub use block::{CodeBlock, ExplanationField, LanguageRow};
pub use language::{Language, LanguageTable};
pub use matrix::{ImplementationMatrix, MatrixError};
pub use registry::{ApproachCoverage, ApproachKeyRegistry, ApproachOrder, Direction};
pub use validation::{ConsistencyValidator, Severity, ValidationReport, Violation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
