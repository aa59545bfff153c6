//! Protected merge ("smart fill")
//!
//! [`MergeEngine`] resolves every record field with its [`FieldRule`], hands
//! implementations to the [`MatrixMerger`], and accounts for each decision in
//! a [`MergeReport`].

use crate::implementations::MatrixMerger;
use crate::policy::{Field, FieldRule, MergePolicy};
use crate::presence::{is_truthy, Presence};
use crate::report::{Decision, ImplementationSummary, MergeReport};
use serde_json::{Map, Value};
use studio_matrix::{ImplementationMatrix, LanguageTable};
use studio_record::{Explanation, Metadata, Record};

/// Merged record plus its account
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Resulting record
    pub record: Record,

    /// What happened to each field
    pub report: MergeReport,
}

/// Field-level protected merge of an incoming payload into a record
///
/// Pure: reads both records and builds a new one. Neither input is modified.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    policy: MergePolicy,
    matrix: MatrixMerger,
}

impl MergeEngine {
    /// Create engine with the standard policy table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: replace the policy table
    #[must_use]
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: canonical language labels for merged rows
    #[must_use]
    pub fn with_language_table(mut self, table: LanguageTable) -> Self {
        self.matrix = self.matrix.with_language_table(table);
        self
    }

    /// Builder: re-broadcast incoming approach explanations after merging
    #[must_use]
    pub fn with_explanation_sync(mut self, enabled: bool) -> Self {
        self.matrix = self.matrix.with_explanation_sync(enabled);
        self
    }

    /// Policy in effect
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Merge `incoming` into `existing`
    #[must_use]
    pub fn merge(&self, existing: &Record, incoming: &Record) -> MergeOutcome {
        let mut report = MergeReport::new();

        let id = self.resolve(Field::Id, &existing.id, &incoming.id, &mut report);
        let name = self.resolve(Field::Name, &existing.name, &incoming.name, &mut report);
        let title = self.resolve(Field::Title, &existing.title, &incoming.title, &mut report);
        let category =
            self.resolve(Field::Category, &existing.category, &incoming.category, &mut report);
        let difficulty = self.resolve(
            Field::Difficulty,
            &existing.difficulty,
            &incoming.difficulty,
            &mut report,
        );
        // a zero serial number counts as unset
        let serial_no = self
            .resolve(
                Field::SerialNo,
                &existing.serial_no.filter(|n| *n != 0),
                &incoming.serial_no.filter(|n| *n != 0),
                &mut report,
            )
            .or(existing.serial_no);
        let description = self.resolve(
            Field::Description,
            &existing.description,
            &incoming.description,
            &mut report,
        );

        let metadata = self.merge_metadata(&existing.metadata, &incoming.metadata, &mut report);
        let explanation =
            self.merge_explanation(&existing.explanation, &incoming.explanation, &mut report);

        let tutorials =
            self.resolve(Field::Tutorials, &existing.tutorials, &incoming.tutorials, &mut report);
        let problems_to_solve = self.resolve(
            Field::ProblemsToSolve,
            &existing.problems_to_solve,
            &incoming.problems_to_solve,
            &mut report,
        );
        let test_cases =
            self.resolve(Field::TestCases, &existing.test_cases, &incoming.test_cases, &mut report);
        let input_schema = self.resolve(
            Field::InputSchema,
            &existing.input_schema,
            &incoming.input_schema,
            &mut report,
        );
        let implementations = self.merge_implementations(
            &existing.implementations,
            &incoming.implementations,
            &mut report,
        );
        let extra = merge_extra("", &existing.extra, &incoming.extra, &mut report);

        let record = Record {
            id,
            name,
            title,
            category,
            difficulty,
            serial_no,
            description,
            metadata,
            explanation,
            implementations,
            tutorials,
            problems_to_solve,
            test_cases,
            input_schema,
            extra,
        };

        tracing::info!(
            took_incoming = report.count(Decision::TookIncoming),
            kept_existing = report.count(Decision::KeptExisting),
            combined = report.count(Decision::Combined),
            implementations = ?report.implementations().outcome,
            "smart fill merged"
        );
        MergeOutcome { record, report }
    }

    /// Apply a keep/prefer rule to one field and record the decision
    fn resolve<T>(&self, field: Field, existing: &T, incoming: &T, report: &mut MergeReport) -> T
    where
        T: Presence + Clone + PartialEq,
    {
        let result = match self.policy.rule(field) {
            FieldRule::PreferIncoming if incoming.is_present() => incoming.clone(),
            FieldRule::PreferIncoming => existing.clone(),
            _ if existing.is_present() => existing.clone(),
            _ => incoming.clone(),
        };
        report.record(field, Decision::classify(existing, incoming, &result));
        result
    }

    fn merge_metadata(
        &self,
        existing: &Metadata,
        incoming: &Metadata,
        report: &mut MergeReport,
    ) -> Metadata {
        let counter = |field: Field, a: &Option<u64>, b: &Option<u64>, r: &mut MergeReport| {
            self.resolve(field, a, b, r).or(Some(0))
        };

        Metadata {
            company_tags: self.resolve(
                Field::CompanyTags,
                &existing.company_tags,
                &incoming.company_tags,
                report,
            ),
            likes: counter(Field::Likes, &existing.likes, &incoming.likes, &mut *report),
            dislikes: counter(Field::Dislikes, &existing.dislikes, &incoming.dislikes, &mut *report),
            time_complexity: self.resolve(
                Field::TimeComplexity,
                &existing.time_complexity,
                &incoming.time_complexity,
                report,
            ),
            space_complexity: self.resolve(
                Field::SpaceComplexity,
                &existing.space_complexity,
                &incoming.space_complexity,
                report,
            ),
            overview: self.resolve(Field::Overview, &existing.overview, &incoming.overview, report),
            extra: merge_extra("metadata", &existing.extra, &incoming.extra, report),
        }
    }

    fn merge_explanation(
        &self,
        existing: &Explanation,
        incoming: &Explanation,
        report: &mut MergeReport,
    ) -> Explanation {
        let result = match self.policy.rule(Field::Explanation) {
            FieldRule::ShallowMerge => shallow_merge(existing, incoming),
            FieldRule::PreferIncoming if !incoming.is_empty() => incoming.clone(),
            FieldRule::PreferIncoming => existing.clone(),
            _ if !existing.is_empty() => existing.clone(),
            _ => incoming.clone(),
        };
        report.record(
            Field::Explanation,
            Decision::classify(existing, incoming, &result),
        );
        result
    }

    fn merge_implementations(
        &self,
        existing: &ImplementationMatrix,
        incoming: &ImplementationMatrix,
        report: &mut MergeReport,
    ) -> ImplementationMatrix {
        let (result, summary) = match self.policy.rule(Field::Implementations) {
            FieldRule::MatrixMerge => self.matrix.merge(existing, incoming),
            FieldRule::PreferIncoming if !incoming.is_empty() => {
                (incoming.clone(), ImplementationSummary::skipped())
            }
            _ if existing.is_empty() => (incoming.clone(), ImplementationSummary::skipped()),
            _ => (existing.clone(), ImplementationSummary::skipped()),
        };
        report.record(
            Field::Implementations,
            Decision::classify(existing, incoming, &result),
        );
        report.set_implementations(summary);
        result
    }
}

/// Per-key explanation merge; incoming non-null keys win
///
/// `comparisonTable` is taken from incoming only when truthy.
fn shallow_merge(existing: &Explanation, incoming: &Explanation) -> Explanation {
    let mut merged = existing.as_map().clone();
    for (key, value) in incoming.as_map() {
        let take = if key == Explanation::COMPARISON_TABLE {
            is_truthy(value)
        } else {
            !value.is_null()
        };
        if take {
            merged.insert(key.clone(), value.clone());
        }
    }
    Explanation::from_map(merged)
}

/// Protect keys outside the policy table: keep existing if present
fn merge_extra(
    prefix: &str,
    existing: &Map<String, Value>,
    incoming: &Map<String, Value>,
    report: &mut MergeReport,
) -> Map<String, Value> {
    let mut merged = existing.clone();
    for (key, value) in incoming {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let current = existing.get(key);
        let decision = if current == Some(value) {
            Decision::Unchanged
        } else if current.is_some_and(|v| v.is_present()) {
            Decision::KeptExisting
        } else {
            merged.insert(key.clone(), value.clone());
            Decision::TookIncoming
        };
        report.record_extra(path, decision);
    }
    merged
}
