//! Edit session
//!
//! An [`EditSession`] owns the one record being authored. Matrix edits are
//! pure snapshot replacements; imports and smart fills go through the
//! [`MergeEngine`]; collaborators are reached only through [`RecordStore`] and
//! [`Generator`].

use crate::config::StudioConfig;
use crate::error::{SessionError, SessionResult};
use crate::generate::{GenerateError, Generator};
use crate::store::RecordStore;
use studio_matrix::{
    ApproachCoverage, ApproachKey, ApproachKeyRegistry, ApproachOrder, Direction,
    ExplanationField, ImplementationMatrix, LanguageTable, MatrixError,
};
use studio_merge::{MergeEngine, MergeReport};
use studio_record::{import_value, parse_import, Record, RecordLoader};

/// In-memory authoring state for one record
#[derive(Debug, Clone)]
pub struct EditSession {
    record: Record,
    persisted_id: Option<String>,
    engine: MergeEngine,
    table: LanguageTable,
    defaults: Vec<ApproachKey>,
}

impl EditSession {
    /// Start a session on a blank record
    ///
    /// # Errors
    /// [`SessionError::Merge`](crate::SessionError::Merge) if the configured merge overrides are invalid
    pub fn new_empty(config: &StudioConfig) -> SessionResult<Self> {
        Self::with_record(Record::new(), None, config)
    }

    /// Start a session on persisted record text
    ///
    /// Legacy double-encoded fields are decoded here. The record counts as
    /// persisted when it carries an id.
    ///
    /// # Errors
    /// [`SessionError::Record`](crate::SessionError::Record) if the text is not a record
    pub fn load(json: &str, config: &StudioConfig) -> SessionResult<Self> {
        let record = RecordLoader::new().load_str(json)?;
        let persisted_id = Some(record.id.clone()).filter(|id| !id.trim().is_empty());
        tracing::info!(id = %record.id, "record loaded into session");
        Self::with_record(record, persisted_id, config)
    }

    fn with_record(
        record: Record,
        persisted_id: Option<String>,
        config: &StudioConfig,
    ) -> SessionResult<Self> {
        Ok(Self {
            record,
            persisted_id,
            engine: config.merge_engine()?,
            table: config.language_table(),
            defaults: config.approach_keys(),
        })
    }

    /// Record being edited
    #[inline]
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Mutable access to scalar fields, metadata and learning lists
    #[inline]
    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    /// Current implementation matrix
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &ImplementationMatrix {
        &self.record.implementations
    }

    /// Check if the record has been created in the store
    #[inline]
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persisted_id.is_some()
    }

    /// Ordered union of approach keys
    #[inline]
    #[must_use]
    pub fn approach_order(&self) -> ApproachOrder {
        self.matrix().approach_order()
    }

    /// Per-approach coverage for "missing" badges
    #[must_use]
    pub fn coverage(&self) -> Vec<ApproachCoverage> {
        ApproachKeyRegistry::coverage(self.matrix())
    }

    /// Whether the (language, approach) cell exists
    #[inline]
    #[must_use]
    pub fn has_cell(&self, language: &str, approach: &str) -> bool {
        self.matrix().has_cell(language, approach)
    }

    /// Add a language row; returns `false` if nothing changed
    pub fn add_language(&mut self, label: &str) -> bool {
        let language = self.table.language(label);
        let defaults = self.defaults.clone();
        self.apply("add_language", |m| m.add_language_with_defaults(language, &defaults))
    }

    /// Remove a language row; returns `false` if absent
    pub fn remove_language(&mut self, language: &str) -> bool {
        self.apply("remove_language", |m| m.remove_language(language))
    }

    /// Broadcast a new approach; returns `false` if nothing changed
    pub fn add_approach(&mut self, raw: &str) -> bool {
        self.apply("add_approach", |m| m.add_approach(raw))
    }

    /// Broadcast deletion of an approach; returns `false` if absent
    pub fn remove_approach(&mut self, raw: &str) -> bool {
        self.apply("remove_approach", |m| m.remove_approach(raw))
    }

    /// Rename an approach everywhere
    ///
    /// Returns `false` and leaves the matrix unchanged on a collision or a
    /// blank target.
    pub fn rename_approach(&mut self, from: &str, to: &str) -> bool {
        match self.matrix().rename_approach(from, to) {
            Ok(next) => self.replace_matrix(next),
            Err(err @ (MatrixError::RenameCollision { .. } | MatrixError::EmptyApproachKey)) => {
                tracing::warn!(from, to, error = %err, "rename rejected");
                false
            }
            Err(err) => {
                tracing::error!(from, to, error = %err, "rename failed consistency gate");
                false
            }
        }
    }

    /// Move an approach one position; returns `false` at a boundary
    pub fn reorder_approach(&mut self, raw: &str, direction: Direction) -> bool {
        self.apply("reorder_approach", |m| m.reorder_approach(raw, direction))
    }

    /// Set one cell's code; returns `false` if the cell is missing
    pub fn set_code(&mut self, language: &str, approach: &str, text: &str) -> bool {
        self.apply("set_code", |m| m.set_code(language, approach, text))
    }

    /// Broadcast an approach explanation
    pub fn set_explanation(&mut self, approach: &str, field: ExplanationField, text: &str) -> bool {
        self.apply("set_explanation", |m| m.set_explanation(approach, field, text))
    }

    /// Parse pasted text and smart-fill it into the record
    ///
    /// # Errors
    /// [`SessionError::Record`](crate::SessionError::Record) if the text is
    /// rejected; the record is then unchanged.
    pub fn import_text(&mut self, text: &str) -> SessionResult<MergeReport> {
        let payload = parse_import(text).map_err(|err| {
            tracing::warn!(error = %err, "import rejected");
            err
        })?;
        Ok(self.smart_fill(&payload))
    }

    /// Ask the generator for a payload to preview
    ///
    /// The result is never applied; pass it to [`smart_fill`](Self::smart_fill)
    /// to accept it.
    ///
    /// # Errors
    /// [`SessionError::Generation`](crate::SessionError::Generation) if the
    /// topic is blank, the collaborator fails, or the payload is not record-shaped
    pub async fn generate(&self, generator: &dyn Generator, topic: &str) -> SessionResult<Record> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(GenerateError::EmptyTopic.into());
        }

        let payload = generator.generate(topic).await?;
        let preview = import_value(payload).map_err(GenerateError::Payload)?;
        tracing::info!(topic, "generated payload ready for preview");
        Ok(preview)
    }

    /// Protected merge of `payload` into the record
    pub fn smart_fill(&mut self, payload: &Record) -> MergeReport {
        let outcome = self.engine.merge(&self.record, payload);
        self.record = outcome.record;
        outcome.report
    }

    /// Persist the record: create the first time, update afterwards
    ///
    /// # Errors
    /// - [`SessionError::Record`](crate::SessionError::Record) if id, name or title is blank
    /// - [`SessionError::IdChanged`](crate::SessionError::IdChanged) if the id was edited
    ///   after the first save
    /// - [`SessionError::Persistence`](crate::SessionError::Persistence) if the store fails;
    ///   the in-memory record is untouched and the save may be retried
    pub async fn save(&mut self, store: &dyn RecordStore) -> SessionResult<Record> {
        self.record.check_identity()?;
        if let Some(persisted) = self.persisted_id.as_deref() {
            if persisted != self.record.id {
                return Err(SessionError::IdChanged {
                    persisted: persisted.to_string(),
                    current: self.record.id.clone(),
                });
            }
        }

        let saved = match &self.persisted_id {
            Some(id) => store.update(id, &self.record).await,
            None => store.create(&self.record).await,
        }
        .map_err(|err| {
            tracing::warn!(id = %self.record.id, error = %err, "save failed");
            err
        })?;

        tracing::info!(id = %saved.id, created = self.persisted_id.is_none(), "record saved");
        self.persisted_id = Some(saved.id.clone());
        self.record = saved.clone();
        Ok(saved)
    }

    /// Discard the session and its unsaved edits
    pub fn cancel(self) {
        tracing::info!(id = %self.record.id, persisted = self.is_persisted(), "edit session cancelled");
    }

    fn apply(
        &mut self,
        operation: &'static str,
        edit: impl FnOnce(&ImplementationMatrix) -> ImplementationMatrix,
    ) -> bool {
        let next = edit(&self.record.implementations);
        let changed = self.replace_matrix(next);
        if !changed {
            tracing::debug!(operation, "matrix unchanged");
        }
        changed
    }

    fn replace_matrix(&mut self, next: ImplementationMatrix) -> bool {
        if next == self.record.implementations {
            return false;
        }
        self.record.implementations = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use serde_json::{json, Value};

    fn session() -> EditSession {
        EditSession::new_empty(&StudioConfig::new()).unwrap()
    }

    struct Canned(Value);

    #[async_trait::async_trait]
    impl Generator for Canned {
        async fn generate(&self, _topic: &str) -> Result<Value, GenerateError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn matrix_ops_report_change() {
        let mut s = session();
        assert!(s.add_language("typescript"));
        assert!(!s.add_language("TypeScript"));
        assert!(s.add_approach("Brute Force"));
        assert!(s.set_code("typescript", "brute-force", "for (;;) {}"));
        assert!(!s.set_code("python", "optimize", "x"));
        assert!(s.reorder_approach("brute-force", Direction::Left));
        assert!(!s.reorder_approach("optimize", Direction::Left));

        let order: Vec<_> = s.approach_order().iter().map(ToString::to_string).collect();
        assert_eq!(order, ["optimize", "brute-force", "starter"]);
    }

    #[test]
    fn configured_defaults_seed_first_row() {
        let config = StudioConfig::new().with_default_approaches(["naive", "optimal"]);
        let mut s = EditSession::new_empty(&config).unwrap();
        s.add_language("go");

        assert!(s.has_cell("Go", "naive"));
        assert!(!s.has_cell("Go", "starter"));
    }

    #[test]
    fn rename_collision_returns_false() {
        let mut s = session();
        s.add_language("java");
        let before = s.matrix().clone();

        assert!(!s.rename_approach("starter", "optimize"));
        assert!(!s.rename_approach("starter", "   "));
        assert_eq!(s.matrix(), &before);
        assert!(s.rename_approach("starter", "template"));
        assert!(s.has_cell("java", "template"));
    }

    #[test]
    fn import_rejection_leaves_record() {
        let mut s = session();
        s.record_mut().title = "Kept".to_string();

        let err = s.import_text("not json").unwrap_err();
        assert!(matches!(err, SessionError::Record(_)));
        assert_eq!(s.record().title, "Kept");

        let err = s.import_text("[]").unwrap_err();
        assert!(matches!(err, SessionError::Record(_)));
    }

    #[test]
    fn import_merges_first_array_element() {
        let mut s = session();
        let report = s
            .import_text(r#"[{"title": "Two Sum"}, {"title": "ignored"}]"#)
            .unwrap();

        assert_eq!(s.record().title, "Two Sum");
        assert!(!report.is_noop());
    }

    #[tokio::test]
    async fn generate_is_preview_only() {
        let s = session();
        let generator = Canned(json!({"title": "Generated"}));

        let preview = s.generate(&generator, "two sum").await.unwrap();
        assert_eq!(preview.title, "Generated");
        assert_eq!(s.record().title, "");

        let err = s.generate(&generator, "  ").await.unwrap_err();
        assert!(matches!(err, SessionError::Generation(GenerateError::EmptyTopic)));
    }

    #[tokio::test]
    async fn save_requires_identity() {
        let mut s = session();
        let store = MemoryStore::new();

        let err = s.save(&store).await.unwrap_err();
        assert!(err.is_validation_error());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_creates_then_updates() {
        let mut s = session();
        s.import_text(r#"{"id": "two-sum", "name": "Two Sum", "title": "Two Sum"}"#)
            .unwrap();
        let store = MemoryStore::new();

        s.save(&store).await.unwrap();
        assert!(s.is_persisted());

        s.record_mut().description = "Find a pair".to_string();
        s.save(&store).await.unwrap();

        let stored = store.get("two-sum").await.unwrap().unwrap();
        assert_eq!(stored.description, "Find a pair");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn save_rejects_edited_id() {
        let mut s = session();
        s.import_text(r#"{"id": "two-sum", "name": "Two Sum", "title": "Two Sum"}"#)
            .unwrap();
        let store = MemoryStore::new();
        s.save(&store).await.unwrap();

        s.record_mut().id = "pair-sum".to_string();
        let err = s.save(&store).await.unwrap_err();
        assert!(matches!(err, SessionError::IdChanged { ref persisted, .. } if persisted == "two-sum"));
        assert!(store.get("pair-sum").await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn loaded_record_updates() {
        let store = MemoryStore::new();
        let mut s = EditSession::load(
            r#"{"id": "bfs", "name": "BFS", "title": "Breadth First"}"#,
            &StudioConfig::new(),
        )
        .unwrap();
        assert!(s.is_persisted());

        let err = s.save(&store).await.unwrap_err();
        assert!(matches!(err, SessionError::Persistence(StoreError::NotFound(_))));
        assert_eq!(s.record().id, "bfs");
    }
}
