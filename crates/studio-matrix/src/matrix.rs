//! Implementation matrix
//!
//! Provides [`ImplementationMatrix`]: language rows, each an ordered list of
//! cells keyed by approach. Every edit is a pure transaction returning a new
//! snapshot; rows are persistent vectors so untouched rows are shared.

use crate::approach::ApproachKey;
use crate::block::{CodeBlock, ExplanationField, LanguageRow};
use crate::language::Language;
use crate::registry::{ApproachKeyRegistry, ApproachOrder, Direction};
use crate::validation::{ConsistencyValidator, ValidationReport};
use im::Vector;
use serde::{Deserialize, Serialize};

/// Sparse language × approach collection of code cells
///
/// A row may omit an approach entirely ("missing"), which is a valid state.
///
/// # Invariants
/// - No row holds two cells with the same approach key
/// - No two rows share a language key
/// - Edits either fully apply or return an identical snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplementationMatrix {
    rows: Vector<LanguageRow>,
}

impl ImplementationMatrix {
    /// Create empty matrix
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create matrix from rows, in registration order
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = LanguageRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Rows in registration order
    pub fn rows(&self) -> impl Iterator<Item = &LanguageRow> {
        self.rows.iter()
    }

    /// Consume into rows
    #[must_use]
    pub fn into_rows(self) -> Vector<LanguageRow> {
        self.rows
    }

    /// Number of language rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if matrix has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a language (case-insensitive)
    #[must_use]
    pub fn row(&self, language: &str) -> Option<&LanguageRow> {
        self.rows.iter().find(|row| row.language.matches(language))
    }

    /// Check if a language row exists
    #[inline]
    #[must_use]
    pub fn contains_language(&self, language: &str) -> bool {
        self.row(language).is_some()
    }

    /// Languages in registration order
    pub fn languages(&self) -> impl Iterator<Item = &Language> {
        self.rows.iter().map(|row| &row.language)
    }

    /// Cell at (language, approach)
    #[must_use]
    pub fn cell(&self, language: &str, approach: &str) -> Option<&CodeBlock> {
        let key = ApproachKey::normalize(approach);
        self.row(language)?.block(&key)
    }

    /// Whether the (language, approach) cell exists
    ///
    /// `false` means "missing", which the UI renders as an informational badge.
    #[inline]
    #[must_use]
    pub fn has_cell(&self, language: &str, approach: &str) -> bool {
        self.cell(language, approach).is_some()
    }

    /// Ordered union of approach keys (see [`ApproachKeyRegistry::order`])
    #[inline]
    #[must_use]
    pub fn approach_order(&self) -> ApproachOrder {
        ApproachKeyRegistry::order(self)
    }

    /// Add a language row seeded with every known approach
    ///
    /// No-op if the language exists. On an empty matrix the row gets
    /// [`ApproachKey::defaults`].
    #[must_use]
    pub fn add_language(&self, language: Language) -> Self {
        self.add_language_with_defaults(language, &ApproachKey::defaults())
    }

    /// [`add_language`](Self::add_language) with a custom fallback approach set
    #[must_use]
    pub fn add_language_with_defaults(&self, language: Language, defaults: &[ApproachKey]) -> Self {
        if language.is_empty() || self.contains_language(language.key()) {
            tracing::debug!(language = %language, "add_language: no-op");
            return self.clone();
        }

        let row = if self.rows.is_empty() {
            LanguageRow::with_approaches(language, defaults)
        } else {
            LanguageRow::with_approaches(language, self.approach_order().keys())
        };

        let mut next = self.clone();
        next.rows.push_back(row);
        self.commit(next, "add_language")
    }

    /// Delete a language row; no-op if absent
    #[must_use]
    pub fn remove_language(&self, language: &str) -> Self {
        let Some(index) = self.rows.iter().position(|row| row.language.matches(language)) else {
            tracing::debug!(language, "remove_language: no-op");
            return self.clone();
        };

        let mut next = self.clone();
        next.rows.remove(index);
        self.commit(next, "remove_language")
    }

    /// Broadcast a new approach to every row lacking it
    ///
    /// Appends an empty cell at the end of each such row; rows already holding
    /// the key are untouched.
    #[must_use]
    pub fn add_approach(&self, raw: &str) -> Self {
        let Some(key) = ApproachKey::parse(raw) else {
            tracing::debug!(raw, "add_approach: blank key");
            return self.clone();
        };

        let mut next = self.clone();
        for row in next.rows.iter_mut().filter(|row| !row.contains(&key)) {
            row.blocks.push_back(CodeBlock::empty(key.clone()));
        }
        self.commit(next, "add_approach")
    }

    /// Broadcast deletion of an approach from every row; idempotent
    #[must_use]
    pub fn remove_approach(&self, raw: &str) -> Self {
        let key = ApproachKey::normalize(raw);
        if !self.approach_order().contains(&key) {
            return self.clone();
        }

        let mut next = self.clone();
        for row in next.rows.iter_mut() {
            if row.contains(&key) {
                row.blocks = row.blocks.iter().filter(|b| b.approach != key).cloned().collect();
            }
        }
        self.commit(next, "remove_approach")
    }

    /// Broadcast a key substitution, keeping content and position
    ///
    /// # Errors
    /// - [`MatrixError::EmptyApproachKey`] if `to` is blank after normalization
    /// - [`MatrixError::RenameCollision`] if `to` already exists as another approach
    /// - [`MatrixError::Inconsistent`] if the result fails the consistency gate
    ///
    /// On error the matrix is unchanged.
    pub fn rename_approach(&self, from: &str, to: &str) -> Result<Self, MatrixError> {
        let from = ApproachKey::normalize(from);
        let to = ApproachKey::parse(to).ok_or(MatrixError::EmptyApproachKey)?;

        if from == to {
            return Ok(self.clone());
        }
        if self.approach_order().contains(&to) {
            return Err(MatrixError::RenameCollision { from, to });
        }

        let mut next = self.clone();
        for row in next.rows.iter_mut() {
            for block in row.blocks.iter_mut().filter(|b| b.approach == from) {
                block.approach = to.clone();
            }
        }

        ConsistencyValidator::new()
            .gate_rename(self, &next, &from, &to)
            .map_err(MatrixError::Inconsistent)?;
        Ok(next)
    }

    /// Swap an approach with its neighbour in [`ApproachOrder`]
    ///
    /// No-op at either boundary. Rows missing either key are left as they are.
    #[must_use]
    pub fn reorder_approach(&self, raw: &str, direction: Direction) -> Self {
        let key = ApproachKey::normalize(raw);
        let order = self.approach_order();
        let Some(partner) = order.neighbor(&key, direction) else {
            tracing::debug!(approach = %key, ?direction, "reorder_approach: at boundary");
            return self.clone();
        };

        let mut next = self.clone();
        for row in next.rows.iter_mut() {
            if let (Some(a), Some(b)) = (row.position(&key), row.position(partner)) {
                row.blocks.swap(a, b);
            }
        }
        self.commit(next, "reorder_approach")
    }

    /// Update the code of one cell; no-op if the cell does not exist
    #[must_use]
    pub fn set_code(&self, language: &str, approach: &str, text: impl Into<String>) -> Self {
        let key = ApproachKey::normalize(approach);
        let Some(row_index) = self.rows.iter().position(|row| row.language.matches(language))
        else {
            return self.clone();
        };
        let Some(block_index) = self.rows[row_index].position(&key) else {
            return self.clone();
        };

        let mut next = self.clone();
        next.rows[row_index].blocks[block_index].code = text.into();
        next
    }

    /// Broadcast an explanation update to every row holding the approach
    ///
    /// Rows missing the approach are unaffected.
    #[must_use]
    pub fn set_explanation(
        &self,
        approach: &str,
        field: ExplanationField,
        text: impl Into<String>,
    ) -> Self {
        let key = ApproachKey::normalize(approach);
        let text = text.into();

        let mut next = self.clone();
        for block in next
            .rows
            .iter_mut()
            .flat_map(|row| row.blocks.iter_mut())
            .filter(|b| b.approach == key)
        {
            field.set(block, text.clone());
        }
        next
    }

    /// Run the consistency validator over this snapshot
    #[inline]
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        ConsistencyValidator::new().check(self)
    }

    /// Admit `next` through the consistency gate or keep `self`
    fn commit(&self, next: Self, operation: &'static str) -> Self {
        match ConsistencyValidator::new().gate(self, &next) {
            Ok(()) => next,
            Err(report) => {
                tracing::error!(operation, %report, "matrix edit rejected by consistency gate");
                self.clone()
            }
        }
    }
}

impl FromIterator<LanguageRow> for ImplementationMatrix {
    fn from_iter<I: IntoIterator<Item = LanguageRow>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}

/// Errors from matrix edits that report failure instead of no-op
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// Rename target already names a different approach
    #[error("cannot rename '{from}' to '{to}': approach already exists")]
    RenameCollision {
        /// Key being renamed
        from: ApproachKey,
        /// Existing key
        to: ApproachKey,
    },

    /// Approach key blank after normalization
    #[error("approach key is blank")]
    EmptyApproachKey,

    /// Edit would break a structural invariant
    #[error("edit rejected: {0}")]
    Inconsistent(ValidationReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(row: &LanguageRow) -> Vec<&str> {
        row.approaches().map(ApproachKey::as_str).collect()
    }

    fn ts_matrix() -> ImplementationMatrix {
        ImplementationMatrix::new()
            .add_language(Language::new("typescript"))
            .set_code("typescript", "optimize", "X")
    }

    #[test]
    fn add_language_on_empty_uses_defaults() {
        let matrix = ImplementationMatrix::new().add_language(Language::new("python"));

        let row = matrix.row("python").unwrap();
        assert_eq!(keys(row), vec!["optimize", "starter"]);
        assert!(row.blocks.iter().all(|b| b.code.is_empty()));
    }

    #[test]
    fn add_language_copies_current_order() {
        let base = ImplementationMatrix::from_rows([LanguageRow::with_approaches(
            Language::new("TypeScript"),
            &[ApproachKey::from("optimize"), ApproachKey::from("bruteforce")],
        )]);

        let matrix = base.add_language(Language::new("java"));
        let row = matrix.row("java").unwrap();
        assert_eq!(keys(row), vec!["optimize", "bruteforce"]);
        assert!(row.blocks.iter().all(|b| b.code.is_empty()));
    }

    #[test]
    fn add_language_twice_is_noop() {
        let once = ts_matrix();
        let twice = once.add_language(Language::new("TYPESCRIPT"));
        assert_eq!(once, twice);
    }

    #[test]
    fn add_language_custom_defaults() {
        let matrix = ImplementationMatrix::new()
            .add_language_with_defaults(Language::new("go"), &[ApproachKey::from("naive")]);
        assert_eq!(keys(matrix.row("go").unwrap()), vec!["naive"]);
    }

    #[test]
    fn remove_language_deletes_row() {
        let matrix = ts_matrix().add_language(Language::new("python"));
        let removed = matrix.remove_language("Python");

        assert_eq!(removed.len(), 1);
        assert!(!removed.contains_language("python"));
        assert_eq!(removed.remove_language("python"), removed);
    }

    #[test]
    fn add_approach_appends_only_where_missing() {
        let matrix = ts_matrix()
            .add_language(Language::new("python"))
            .remove_approach("starter")
            .add_approach("Brute Force");

        for row in matrix.rows() {
            assert_eq!(keys(row), vec!["optimize", "brute-force"]);
        }
        // existing content untouched
        assert_eq!(matrix.cell("typescript", "optimize").unwrap().code, "X");
    }

    #[test]
    fn add_existing_approach_is_noop() {
        let matrix = ts_matrix();
        assert_eq!(matrix.add_approach("optimize"), matrix);
        assert_eq!(matrix.add_approach("   "), matrix);
    }

    #[test]
    fn remove_approach_is_idempotent() {
        let matrix = ts_matrix().add_language(Language::new("java"));
        let once = matrix.remove_approach("starter");
        let twice = once.remove_approach("starter");

        assert_eq!(once, twice);
        assert!(!once.has_cell("java", "starter"));
    }

    #[test]
    fn rename_preserves_content_and_position() {
        let matrix = ts_matrix()
            .set_explanation("optimize", ExplanationField::After, "why")
            .rename_approach("optimize", "Two Pointers")
            .unwrap();

        let row = matrix.row("typescript").unwrap();
        assert_eq!(keys(row), vec!["two-pointers", "starter"]);
        assert_eq!(row.blocks[0].code, "X");
        assert_eq!(row.blocks[0].explanation_after, "why");
    }

    #[test]
    fn rename_collision_leaves_matrix_unchanged() {
        let matrix = ts_matrix();
        let err = matrix.rename_approach("optimize", "starter").unwrap_err();
        assert!(matches!(err, MatrixError::RenameCollision { .. }));
    }

    #[test]
    fn rename_to_same_key_is_noop() {
        let matrix = ts_matrix();
        assert_eq!(matrix.rename_approach("optimize", "OPTIMIZE").unwrap(), matrix);
    }

    #[test]
    fn rename_to_blank_fails() {
        let err = ts_matrix().rename_approach("optimize", " ").unwrap_err();
        assert!(matches!(err, MatrixError::EmptyApproachKey));
    }

    #[test]
    fn reorder_swaps_neighbours() {
        let matrix = ts_matrix().reorder_approach("starter", Direction::Left);
        assert_eq!(keys(matrix.row("typescript").unwrap()), vec!["starter", "optimize"]);
    }

    #[test]
    fn reorder_at_left_boundary_is_noop() {
        let matrix = ts_matrix();
        assert_eq!(matrix.reorder_approach("optimize", Direction::Left), matrix);
        assert_eq!(matrix.reorder_approach("starter", Direction::Right), matrix);
    }

    #[test]
    fn reorder_skips_rows_missing_partner() {
        let matrix = ImplementationMatrix::from_rows([
            LanguageRow::with_approaches(
                Language::new("typescript"),
                &[ApproachKey::from("a"), ApproachKey::from("b")],
            ),
            LanguageRow::with_approaches(Language::new("python"), &[ApproachKey::from("b")]),
        ]);

        let reordered = matrix.reorder_approach("b", Direction::Left);
        assert_eq!(keys(reordered.row("typescript").unwrap()), vec!["b", "a"]);
        assert_eq!(keys(reordered.row("python").unwrap()), vec!["b"]);
    }

    #[test]
    fn set_code_targets_single_cell() {
        let matrix = ts_matrix().add_language(Language::new("java")).set_code("java", "optimize", "Y");

        assert_eq!(matrix.cell("java", "optimize").unwrap().code, "Y");
        assert_eq!(matrix.cell("typescript", "optimize").unwrap().code, "X");
    }

    #[test]
    fn set_code_on_missing_cell_is_noop() {
        let matrix = ts_matrix();
        assert_eq!(matrix.set_code("rust", "optimize", "Z"), matrix);
        assert_eq!(matrix.set_code("typescript", "greedy", "Z"), matrix);
    }

    #[test]
    fn set_explanation_broadcasts_to_holders_only() {
        let matrix = ts_matrix().add_language(Language::new("java"));
        let matrix = ImplementationMatrix::from_rows(matrix.rows().cloned().chain([
            LanguageRow::with_approaches(Language::new("go"), &[ApproachKey::from("starter")]),
        ]));

        let updated = matrix.set_explanation("optimize", ExplanationField::Before, "shared");
        assert_eq!(updated.cell("typescript", "optimize").unwrap().explanation_before, "shared");
        assert_eq!(updated.cell("java", "optimize").unwrap().explanation_before, "shared");
        assert!(!updated.has_cell("go", "optimize"));
        assert!(updated.validate().is_clean());
    }

    #[test]
    fn edits_do_not_mutate_source_snapshot() {
        let before = ts_matrix();
        let snapshot = before.clone();
        let _after = before.add_approach("dp").remove_approach("optimize");
        assert_eq!(before, snapshot);
    }

    #[test]
    fn serializes_as_row_array() {
        let value = serde_json::to_value(ts_matrix()).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["lang"], "TypeScript");
        assert_eq!(value[0]["code"][0]["codeType"], "optimize");
        assert_eq!(value[0]["code"][0]["code"], "X");
    }
}
