//! Consistency validation for implementation matrices
//!
//! [`ConsistencyValidator`] checks matrix snapshots after structural edits.
//! It never panics or returns errors to callers on its own; the matrix uses
//! [`ConsistencyValidator::gate`] to refuse snapshots that introduce new
//! error-level violations. A failing gate indicates a bug in an edit, not a
//! normal runtime condition.

use crate::approach::ApproachKey;
use crate::block::ExplanationField;
use crate::matrix::ImplementationMatrix;
use crate::registry::ApproachKeyRegistry;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

/// Structural invariant checker
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Check every invariant on a snapshot
    #[must_use]
    pub fn check(&self, matrix: &ImplementationMatrix) -> ValidationReport {
        let mut violations = Vec::new();
        let registry = ApproachKeyRegistry::order(matrix);
        let mut languages = HashSet::new();

        for row in matrix.rows() {
            let language = row.language.label().to_string();

            if row.language.is_empty() {
                violations.push(Violation::EmptyLanguage);
            } else if !languages.insert(row.language.key()) {
                violations.push(Violation::DuplicateLanguage {
                    language: language.clone(),
                });
            }

            let mut seen = HashSet::new();
            for key in row.approaches() {
                if key.is_empty() {
                    violations.push(Violation::EmptyApproachKey {
                        language: language.clone(),
                    });
                    continue;
                }
                if !seen.insert(key) {
                    violations.push(Violation::DuplicateApproach {
                        language: language.clone(),
                        approach: key.clone(),
                    });
                }
                if !registry.contains(key) {
                    violations.push(Violation::OrphanedApproach {
                        language: language.clone(),
                        approach: key.clone(),
                    });
                }
            }
        }

        violations.extend(Self::explanation_drift(matrix));
        ValidationReport { violations }
    }

    /// Check a rename result: full check plus no stale copy of the old key
    #[must_use]
    pub fn check_rename(
        &self,
        after: &ImplementationMatrix,
        from: &ApproachKey,
        to: &ApproachKey,
    ) -> ValidationReport {
        let mut report = self.check(after);
        if from != to {
            for row in after.rows().filter(|row| row.contains(from)) {
                report.violations.push(Violation::StaleRename {
                    language: row.language.label().to_string(),
                    approach: from.clone(),
                });
            }
        }
        report
    }

    /// Admit `after` unless it holds error-level violations `before` did not
    ///
    /// Pre-existing violations (e.g. dirty persisted data) do not block edits.
    ///
    /// # Errors
    /// Returns the report of newly introduced errors
    pub fn gate(
        &self,
        before: &ImplementationMatrix,
        after: &ImplementationMatrix,
    ) -> Result<(), ValidationReport> {
        Self::admit(&self.check(before), self.check(after))
    }

    /// [`gate`](Self::gate) for a rename transition
    ///
    /// # Errors
    /// Returns the report of newly introduced errors
    pub fn gate_rename(
        &self,
        before: &ImplementationMatrix,
        after: &ImplementationMatrix,
        from: &ApproachKey,
        to: &ApproachKey,
    ) -> Result<(), ValidationReport> {
        Self::admit(&self.check(before), self.check_rename(after, from, to))
    }

    fn admit(before: &ValidationReport, after: ValidationReport) -> Result<(), ValidationReport> {
        let introduced: Vec<_> = after
            .violations
            .into_iter()
            .filter(|v| v.severity() == Severity::Error && !before.violations.contains(v))
            .collect();

        if introduced.is_empty() {
            Ok(())
        } else {
            Err(ValidationReport {
                violations: introduced,
            })
        }
    }

    /// Approach keys whose cells disagree on explanation text
    fn explanation_drift(matrix: &ImplementationMatrix) -> Vec<Violation> {
        let mut first: HashMap<(&ApproachKey, ExplanationField), &str> = HashMap::new();
        let mut drifted = Vec::new();

        for block in matrix.rows().flat_map(|row| row.blocks.iter()) {
            for field in ExplanationField::ALL {
                let text = field.get(block);
                let reference = *first.entry((&block.approach, field)).or_insert(text);
                let violation = Violation::ExplanationDrift {
                    approach: block.approach.clone(),
                    field,
                };
                if reference != text && !drifted.contains(&violation) {
                    drifted.push(violation);
                }
            }
        }

        drifted
    }
}

/// How serious a violation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Advisory only, never gates an edit
    Warning,

    /// Structural invariant broken
    Error,
}

/// A single broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Row holds two cells with the same approach key
    DuplicateApproach {
        /// Row label
        language: String,
        /// Repeated key
        approach: ApproachKey,
    },

    /// Two rows share a language key
    DuplicateLanguage {
        /// Row label
        language: String,
    },

    /// Row has no language identity
    EmptyLanguage,

    /// Cell has a blank approach key
    EmptyApproachKey {
        /// Row label
        language: String,
    },

    /// Row key missing from the registry union
    OrphanedApproach {
        /// Row label
        language: String,
        /// Orphaned key
        approach: ApproachKey,
    },

    /// Old key survived a rename
    StaleRename {
        /// Row label
        language: String,
        /// Old key
        approach: ApproachKey,
    },

    /// Cells of one approach disagree on an explanation field
    ExplanationDrift {
        /// Drifted approach
        approach: ApproachKey,
        /// Drifted field
        field: ExplanationField,
    },
}

impl Violation {
    /// Severity class
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::ExplanationDrift { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateApproach { language, approach } => {
                write!(f, "{language}: duplicate approach '{approach}'")
            }
            Self::DuplicateLanguage { language } => write!(f, "duplicate language row '{language}'"),
            Self::EmptyLanguage => write!(f, "row without language"),
            Self::EmptyApproachKey { language } => write!(f, "{language}: blank approach key"),
            Self::OrphanedApproach { language, approach } => {
                write!(f, "{language}: approach '{approach}' not in registry")
            }
            Self::StaleRename { language, approach } => {
                write!(f, "{language}: '{approach}' still present after rename")
            }
            Self::ExplanationDrift { approach, field } => {
                write!(f, "approach '{approach}': {} differs across languages", field.name())
            }
        }
    }
}

/// Result of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// All violations found
    #[inline]
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Check if nothing was found, warnings included
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Check if any error-level violation was found
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Error-level violations
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.severity() == Severity::Error)
    }

    /// Warning-level violations
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.severity() == Severity::Warning)
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return f.write_str("consistent");
        }
        let parts: Vec<_> = self.violations.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}
