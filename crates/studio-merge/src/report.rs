//! Merge report
//!
//! Records, per field, what the merge engine did with the two sides so no
//! overwrite of curator work goes unnoticed.

use crate::policy::Field;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use studio_matrix::{ApproachKey, Language};

/// What happened to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Both sides were equal
    Unchanged,

    /// Existing value kept, incoming discarded
    KeptExisting,

    /// Incoming value replaced existing
    TookIncoming,

    /// Result draws from both sides
    Combined,
}

impl Decision {
    /// Classify a resolved value against its two inputs
    #[must_use]
    pub fn classify<T: PartialEq>(existing: &T, incoming: &T, result: &T) -> Self {
        if existing == incoming {
            Self::Unchanged
        } else if result == existing {
            Self::KeptExisting
        } else if result == incoming {
            Self::TookIncoming
        } else {
            Self::Combined
        }
    }

    /// Wire name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::KeptExisting => "kept_existing",
            Self::TookIncoming => "took_incoming",
            Self::Combined => "combined",
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decision for one policy field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDecision {
    /// Field resolved
    pub field: Field,

    /// Outcome
    pub decision: Decision,
}

/// A single (language, approach) cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellRef {
    /// Row language
    pub language: Language,

    /// Cell approach
    pub approach: ApproachKey,
}

impl Display for CellRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.language, self.approach)
    }
}

/// How the implementations merge ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ImplementationOutcome {
    /// Incoming list was empty; existing untouched
    Skipped,

    /// Merged result substituted
    Merged,

    /// Incoming payload malformed; existing untouched
    Aborted(String),
}

/// Cell-level account of the implementations merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementationSummary {
    /// Final status
    pub outcome: ImplementationOutcome,

    /// Existing cells replaced in place
    pub overwritten: Vec<CellRef>,

    /// Cells appended to a row
    pub appended: Vec<CellRef>,

    /// Rows created for languages the record did not have
    pub languages_added: Vec<Language>,

    /// Approach keys whose explanations were re-broadcast
    pub explanations_synced: Vec<ApproachKey>,
}

impl ImplementationSummary {
    /// Summary for a merge that did not run
    #[must_use]
    pub fn skipped() -> Self {
        Self::with_outcome(ImplementationOutcome::Skipped)
    }

    /// Summary for a merge abandoned on a payload error
    #[must_use]
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::with_outcome(ImplementationOutcome::Aborted(reason.into()))
    }

    fn with_outcome(outcome: ImplementationOutcome) -> Self {
        Self {
            outcome,
            overwritten: Vec::new(),
            appended: Vec::new(),
            languages_added: Vec::new(),
            explanations_synced: Vec::new(),
        }
    }

    /// Check if the merged matrix was substituted
    #[inline]
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.outcome == ImplementationOutcome::Merged
    }

    /// Check if the merge was abandoned
    #[inline]
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, ImplementationOutcome::Aborted(_))
    }
}

impl Default for ImplementationSummary {
    fn default() -> Self {
        Self::skipped()
    }
}

/// Account of one smart-fill
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergeReport {
    fields: Vec<FieldDecision>,
    extras: IndexMap<String, Decision>,
    implementations: ImplementationSummary,
}

impl MergeReport {
    /// Create empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a policy field outcome
    pub fn record(&mut self, field: Field, decision: Decision) {
        self.fields.push(FieldDecision { field, decision });
    }

    /// Record an outcome for a key outside the policy table
    pub fn record_extra(&mut self, path: impl Into<String>, decision: Decision) {
        self.extras.insert(path.into(), decision);
    }

    /// Attach the implementations summary
    pub fn set_implementations(&mut self, summary: ImplementationSummary) {
        self.implementations = summary;
    }

    /// Policy field outcomes, in record order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDecision] {
        &self.fields
    }

    /// Outcome for one policy field
    #[must_use]
    pub fn decision(&self, field: Field) -> Option<Decision> {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.decision)
    }

    /// Outcomes for keys outside the policy table (e.g. `metadata.views`)
    #[inline]
    #[must_use]
    pub fn extras(&self) -> &IndexMap<String, Decision> {
        &self.extras
    }

    /// Implementations summary
    #[inline]
    #[must_use]
    pub fn implementations(&self) -> &ImplementationSummary {
        &self.implementations
    }

    /// Number of fields (policy and extra) with the given outcome
    #[must_use]
    pub fn count(&self, decision: Decision) -> usize {
        self.fields.iter().filter(|e| e.decision == decision).count()
            + self.extras.values().filter(|d| **d == decision).count()
    }

    /// Check if the merge changed nothing
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.count(Decision::TookIncoming) == 0 && self.count(Decision::Combined) == 0
    }
}

impl Display for MergeReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for entry in &self.fields {
            if entry.decision != Decision::Unchanged {
                writeln!(f, "{:<28} {}", entry.field.path(), entry.decision)?;
            }
        }
        for (path, decision) in &self.extras {
            if *decision != Decision::Unchanged {
                writeln!(f, "{path:<28} {decision}")?;
            }
        }

        let summary = &self.implementations;
        match &summary.outcome {
            ImplementationOutcome::Skipped => writeln!(f, "implementations: skipped"),
            ImplementationOutcome::Aborted(reason) => {
                writeln!(f, "implementations: aborted ({reason})")
            }
            ImplementationOutcome::Merged => writeln!(
                f,
                "implementations: {} overwritten, {} appended, {} languages added",
                summary.overwritten.len(),
                summary.appended.len(),
                summary.languages_added.len()
            ),
        }
    }
}
