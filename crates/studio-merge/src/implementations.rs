//! Implementation matrix merge
//!
//! Folds an incoming matrix into an existing one cell by cell: matching
//! (language, approach) cells are overwritten in place, new cells are
//! appended, new languages get new rows. The result is all-or-nothing.

use crate::error::{MergeError, MergeResult};
use crate::report::{CellRef, ImplementationOutcome, ImplementationSummary};
use im::Vector;
use indexmap::IndexMap;
use studio_matrix::{
    ApproachKey, CodeBlock, ConsistencyValidator, ExplanationField, ImplementationMatrix,
    Language, LanguageRow, LanguageTable,
};

/// Working map entry: row language and its cells
type WorkingRow = (Language, Vector<CodeBlock>);

/// Cell-level merger for implementation matrices
#[derive(Debug, Clone)]
pub struct MatrixMerger {
    table: LanguageTable,
    sync_explanations: bool,
}

impl MatrixMerger {
    /// Create merger with the built-in language table and explanation sync on
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: LanguageTable::builtin(),
            sync_explanations: true,
        }
    }

    /// Builder: canonical label table used when re-materializing rows
    #[must_use]
    pub fn with_language_table(mut self, table: LanguageTable) -> Self {
        self.table = table;
        self
    }

    /// Builder: re-broadcast incoming explanations across rows
    #[must_use]
    pub fn with_explanation_sync(mut self, enabled: bool) -> Self {
        self.sync_explanations = enabled;
        self
    }

    /// Merge `incoming` into `existing`
    ///
    /// Never fails: a malformed payload leaves `existing` as it is and the
    /// summary says why.
    #[must_use]
    pub fn merge(
        &self,
        existing: &ImplementationMatrix,
        incoming: &ImplementationMatrix,
    ) -> (ImplementationMatrix, ImplementationSummary) {
        if incoming.is_empty() {
            tracing::debug!("incoming implementations empty; existing kept");
            return (existing.clone(), ImplementationSummary::skipped());
        }

        match self.try_merge(existing, incoming) {
            Ok(merged) => merged,
            Err(err) => {
                tracing::warn!(error = %err, "implementations merge aborted; existing kept");
                (existing.clone(), ImplementationSummary::aborted(err.to_string()))
            }
        }
    }

    /// Merge or report the first payload error
    ///
    /// # Errors
    /// - [`MergeError::BlankLanguage`] / [`MergeError::BlankApproach`] for malformed rows
    /// - [`MergeError::Inconsistent`] if the merged matrix fails the consistency gate
    pub fn try_merge(
        &self,
        existing: &ImplementationMatrix,
        incoming: &ImplementationMatrix,
    ) -> MergeResult<(ImplementationMatrix, ImplementationSummary)> {
        let mut summary = ImplementationSummary::skipped();
        summary.outcome = ImplementationOutcome::Merged;

        let mut working: IndexMap<String, WorkingRow> = IndexMap::new();
        for row in existing.rows() {
            working
                .entry(row.language.key().to_string())
                .and_modify(|(_, blocks)| blocks.append(row.blocks.clone()))
                .or_insert_with(|| (row.language.clone(), row.blocks.clone()));
        }

        for (index, row) in incoming.rows().enumerate() {
            if row.language.is_empty() {
                return Err(MergeError::BlankLanguage { index });
            }

            let (language, blocks) = working
                .entry(row.language.key().to_string())
                .or_insert_with(|| {
                    summary.languages_added.push(row.language.clone());
                    (row.language.clone(), Vector::new())
                });

            for (index, block) in row.blocks.iter().enumerate() {
                if block.approach.is_empty() {
                    return Err(MergeError::BlankApproach {
                        language: row.language.label().to_string(),
                        index,
                    });
                }

                let cell = CellRef {
                    language: language.clone(),
                    approach: block.approach.clone(),
                };
                match blocks.iter().position(|b| b.approach == block.approach) {
                    Some(pos) => {
                        blocks[pos] = block.clone();
                        summary.overwritten.push(cell);
                    }
                    None => {
                        blocks.push_back(block.clone());
                        summary.appended.push(cell);
                    }
                }
            }
        }

        let mut merged: ImplementationMatrix = working
            .into_values()
            .map(|(language, blocks)| {
                let mut row = LanguageRow::new(self.table.recanonicalize(&language));
                row.blocks = blocks;
                row
            })
            .collect();

        if self.sync_explanations {
            let (synced, keys) = sync_explanations(&merged, incoming);
            merged = synced;
            summary.explanations_synced = keys;
        }

        ConsistencyValidator::new()
            .gate(existing, &merged)
            .map_err(MergeError::Inconsistent)?;

        tracing::debug!(
            overwritten = summary.overwritten.len(),
            appended = summary.appended.len(),
            languages_added = summary.languages_added.len(),
            "implementations merged"
        );
        Ok((merged, summary))
    }
}

impl Default for MatrixMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-broadcast the last non-empty incoming explanation of each touched key
fn sync_explanations(
    merged: &ImplementationMatrix,
    incoming: &ImplementationMatrix,
) -> (ImplementationMatrix, Vec<ApproachKey>) {
    let mut latest: IndexMap<(ApproachKey, ExplanationField), &str> = IndexMap::new();
    for block in incoming.rows().flat_map(|row| row.blocks.iter()) {
        for field in ExplanationField::ALL {
            let text = field.get(block);
            if !text.trim().is_empty() {
                latest.insert((block.approach.clone(), field), text);
            }
        }
    }

    let mut synced = merged.clone();
    let mut keys: Vec<ApproachKey> = Vec::new();
    for ((approach, field), text) in latest {
        synced = synced.set_explanation(approach.as_str(), field, text);
        if !keys.contains(&approach) {
            keys.push(approach);
        }
    }
    (synced, keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(approach: &str, code: &str) -> CodeBlock {
        CodeBlock::empty(ApproachKey::from(approach)).with_code(code)
    }

    fn row(language: &str, blocks: Vec<CodeBlock>) -> LanguageRow {
        blocks
            .into_iter()
            .fold(LanguageRow::new(Language::new(language)), LanguageRow::with_block)
    }

    #[test]
    fn empty_incoming_is_skipped() {
        let existing = ImplementationMatrix::from_rows([row("java", vec![block("optimize", "A")])]);
        let (merged, summary) = MatrixMerger::new().merge(&existing, &ImplementationMatrix::new());

        assert_eq!(merged, existing);
        assert_eq!(summary.outcome, ImplementationOutcome::Skipped);
    }

    #[test]
    fn overwrites_in_place_and_appends() {
        let existing = ImplementationMatrix::from_rows([row(
            "TypeScript",
            vec![block("optimize", "X"), block("starter", "S")],
        )]);
        let incoming = ImplementationMatrix::from_rows([row(
            "typescript",
            vec![block("bruteforce", "B"), block("optimize", "Y")],
        )]);

        let (merged, summary) = MatrixMerger::new().merge(&existing, &incoming);
        let ts = merged.row("typescript").unwrap();
        let order: Vec<_> = ts.approaches().map(ApproachKey::as_str).collect();

        assert_eq!(merged.len(), 1);
        assert_eq!(ts.language.label(), "TypeScript");
        assert_eq!(order, vec!["optimize", "starter", "bruteforce"]);
        assert_eq!(merged.cell("typescript", "optimize").unwrap().code, "Y");
        assert_eq!(summary.overwritten.len(), 1);
        assert_eq!(summary.appended.len(), 1);
        assert!(summary.languages_added.is_empty());
    }

    #[test]
    fn new_language_gets_canonical_label() {
        let existing = ImplementationMatrix::from_rows([row("Java", vec![block("optimize", "J")])]);
        let incoming = ImplementationMatrix::from_rows([row("c++", vec![block("optimize", "C")])]);

        let (merged, summary) = MatrixMerger::new().merge(&existing, &incoming);
        let labels: Vec<_> = merged.languages().map(Language::label).collect();

        assert_eq!(labels, vec!["Java", "C++"]);
        assert_eq!(summary.languages_added.len(), 1);
    }

    #[test]
    fn configured_table_relabels_rows() {
        let table = LanguageTable::builtin().with_entries([("elixir", "Elixir")]);
        let incoming = ImplementationMatrix::from_rows([row("elixir", vec![block("optimize", "E")])]);

        let (merged, _) = MatrixMerger::new()
            .with_language_table(table)
            .merge(&ImplementationMatrix::new(), &incoming);
        assert_eq!(merged.row("ELIXIR").unwrap().language.label(), "Elixir");
    }

    #[test]
    fn blank_approach_aborts() {
        let existing = ImplementationMatrix::from_rows([row("java", vec![block("optimize", "A")])]);
        let incoming = ImplementationMatrix::from_rows([row(
            "java",
            vec![block("optimize", "B"), block("   ", "C")],
        )]);

        let (merged, summary) = MatrixMerger::new().merge(&existing, &incoming);
        assert_eq!(merged, existing);
        assert!(summary.is_aborted());
    }

    #[test]
    fn blank_language_is_error() {
        let incoming = ImplementationMatrix::from_rows([row("", vec![block("optimize", "B")])]);
        let err = MatrixMerger::new()
            .try_merge(&ImplementationMatrix::new(), &incoming)
            .unwrap_err();
        assert!(matches!(err, MergeError::BlankLanguage { index: 0 }));
    }

    #[test]
    fn explanations_rebroadcast_to_every_holder() {
        let existing = ImplementationMatrix::from_rows([
            row("java", vec![block("optimize", "J")]),
            row("python", vec![block("optimize", "P")]),
        ]);
        let incoming = ImplementationMatrix::from_rows([row(
            "java",
            vec![block("optimize", "J2").with_explanation(ExplanationField::Before, "Hash it")],
        )]);

        let (merged, summary) = MatrixMerger::new().merge(&existing, &incoming);
        assert_eq!(merged.cell("python", "optimize").unwrap().explanation_before, "Hash it");
        assert_eq!(merged.cell("python", "optimize").unwrap().code, "P");
        assert_eq!(summary.explanations_synced, vec![ApproachKey::from("optimize")]);
        assert!(merged.validate().warnings().next().is_none());
    }

    #[test]
    fn explanation_sync_can_be_disabled() {
        let existing = ImplementationMatrix::from_rows([
            row("java", vec![block("optimize", "J")]),
            row("python", vec![block("optimize", "P")]),
        ]);
        let incoming = ImplementationMatrix::from_rows([row(
            "java",
            vec![block("optimize", "J2").with_explanation(ExplanationField::Before, "Hash it")],
        )]);

        let (merged, summary) = MatrixMerger::new()
            .with_explanation_sync(false)
            .merge(&existing, &incoming);
        assert_eq!(merged.cell("python", "optimize").unwrap().explanation_before, "");
        assert!(summary.explanations_synced.is_empty());
    }
}
