//! Algo Studio Record Model
//!
//! The trusted boundary between persisted/pasted JSON and the edit session.
//!
//! # Core Operations
//!
//! - **Load**: [`RecordLoader`] parses persisted JSON, decoding legacy
//!   double-encoded fields exactly once
//! - **Import**: [`parse_import`] turns pasted text into a payload for merging
//! - **Validate**: [`Record::check_identity`] gates saving
//!
//! # Example
//!
//! ```rust
//! use studio_record::{parse_import, RecordLoader};
//!
//! let stored = r#"{"id": "bfs", "implementations": "[{\"lang\": \"go\", \"code\": []}]"}"#;
//! let record = RecordLoader::new().load_str(stored).unwrap();
//! assert!(record.implementations.contains_language("Go"));
//!
//! let payload = parse_import(r#"[{"title": "Breadth First Search"}]"#).unwrap();
//! assert_eq!(payload.title, "Breadth First Search");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod import;
pub mod loader;
pub mod record;

// Re-exports for convenience
pub use error::{RecordError, RecordResult};
pub use import::{import_value, parse_import};
pub use loader::{RecordLoader, LEGACY_FIELDS};
pub use record::{Explanation, Metadata, Record};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
