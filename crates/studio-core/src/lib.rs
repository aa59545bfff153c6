//! Algo Studio Core - Edit Session
//!
//! Ties the authoring core together:
//! - Loads records (decoding legacy double-encoded fields)
//! - Routes matrix edits through the consistency gate
//! - Imports pasted payloads and smart-fills them into the record
//! - Previews generated payloads without applying them
//! - Saves through a persistence collaborator (create, then update)
//!
//! # Example
//!
//! ```rust
//! use studio_core::{EditSession, MemoryStore, StudioConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = EditSession::new_empty(&StudioConfig::new())?;
//! session.add_language("typescript");
//! session.set_code("typescript", "optimize", "return a + b;");
//! session.import_text(r#"{"id": "two-sum", "name": "Two Sum", "title": "Two Sum"}"#)?;
//!
//! let store = MemoryStore::new();
//! session.save(&store).await?;
//! assert!(session.is_persisted());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod generate;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use config::{ConfigError, MergeConfig, StudioConfig};
pub use error::{SessionError, SessionResult};
pub use generate::{GenerateError, Generator};
pub use session::EditSession;
pub use store::{FileStore, MemoryStore, RecordStore, StoreError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with an edit session
    pub use crate::{EditSession, MemoryStore, RecordStore, SessionError, StudioConfig};
    pub use studio_matrix::{Direction, ExplanationField, ImplementationMatrix, Language};
    pub use studio_merge::{Decision, Field, MergeReport};
    pub use studio_record::Record;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
