//! Field protection policy
//!
//! Provides [`MergePolicy`], the table mapping each record [`Field`] to the
//! [`FieldRule`] the merge engine applies to it.

use crate::error::MergeError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// How a field resolves existing vs incoming values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// Keep existing if present, else take incoming
    KeepExisting,

    /// Take incoming if present, else keep existing
    PreferIncoming,

    /// Per-key merge of two objects, incoming wins per key
    ShallowMerge,

    /// Cell-level merge of implementation matrices
    MatrixMerge,
}

impl FieldRule {
    /// Wire name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::KeepExisting => "keep_existing",
            Self::PreferIncoming => "prefer_incoming",
            Self::ShallowMerge => "shallow_merge",
            Self::MatrixMerge => "matrix_merge",
        }
    }
}

impl Display for FieldRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record fields the merge engine resolves individually
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// `id`
    Id,
    /// `name`
    Name,
    /// `title`
    Title,
    /// `category`
    Category,
    /// `difficulty`
    Difficulty,
    /// `serial_no`
    SerialNo,
    /// `description`
    Description,
    /// `metadata.companyTags`
    CompanyTags,
    /// `metadata.likes`
    Likes,
    /// `metadata.dislikes`
    Dislikes,
    /// `metadata.timeComplexity`
    TimeComplexity,
    /// `metadata.spaceComplexity`
    SpaceComplexity,
    /// `metadata.overview`
    Overview,
    /// `explanation`
    Explanation,
    /// `tutorials`
    Tutorials,
    /// `problems_to_solve`
    ProblemsToSolve,
    /// `test_cases`
    TestCases,
    /// `input_schema`
    InputSchema,
    /// `implementations`
    Implementations,
}

impl Field {
    /// Every field, in record order
    pub const ALL: [Self; 19] = [
        Self::Id,
        Self::Name,
        Self::Title,
        Self::Category,
        Self::Difficulty,
        Self::SerialNo,
        Self::Description,
        Self::CompanyTags,
        Self::Likes,
        Self::Dislikes,
        Self::TimeComplexity,
        Self::SpaceComplexity,
        Self::Overview,
        Self::Explanation,
        Self::Tutorials,
        Self::ProblemsToSolve,
        Self::TestCases,
        Self::InputSchema,
        Self::Implementations,
    ];

    /// Dotted path of the field within a record
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Title => "title",
            Self::Category => "category",
            Self::Difficulty => "difficulty",
            Self::SerialNo => "serial_no",
            Self::Description => "description",
            Self::CompanyTags => "metadata.companyTags",
            Self::Likes => "metadata.likes",
            Self::Dislikes => "metadata.dislikes",
            Self::TimeComplexity => "metadata.timeComplexity",
            Self::SpaceComplexity => "metadata.spaceComplexity",
            Self::Overview => "metadata.overview",
            Self::Explanation => "explanation",
            Self::Tutorials => "tutorials",
            Self::ProblemsToSolve => "problems_to_solve",
            Self::TestCases => "test_cases",
            Self::InputSchema => "input_schema",
            Self::Implementations => "implementations",
        }
    }

    /// Rules this field can be configured with
    #[must_use]
    pub fn allowed_rules(self) -> &'static [FieldRule] {
        match self {
            Self::Explanation => &[
                FieldRule::ShallowMerge,
                FieldRule::KeepExisting,
                FieldRule::PreferIncoming,
            ],
            Self::Implementations => &[
                FieldRule::MatrixMerge,
                FieldRule::KeepExisting,
                FieldRule::PreferIncoming,
            ],
            _ => &[FieldRule::KeepExisting, FieldRule::PreferIncoming],
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

impl FromStr for Field {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.path() == s)
            .ok_or_else(|| MergeError::UnknownField(s.to_string()))
    }
}

/// Field → rule table
///
/// [`MergePolicy::standard`] is the curator-protection table: identity,
/// counters, complexities and learning lists keep existing content;
/// `metadata.overview` always refreshes from incoming; `explanation` merges
/// per key; `implementations` merges per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePolicy {
    rules: BTreeMap<Field, FieldRule>,
}

impl MergePolicy {
    /// The standard protection table
    #[must_use]
    pub fn standard() -> Self {
        let rules = Field::ALL
            .into_iter()
            .map(|field| {
                let rule = match field {
                    Field::Overview => FieldRule::PreferIncoming,
                    Field::Explanation => FieldRule::ShallowMerge,
                    Field::Implementations => FieldRule::MatrixMerge,
                    _ => FieldRule::KeepExisting,
                };
                (field, rule)
            })
            .collect();
        Self { rules }
    }

    /// Rule for a field
    #[inline]
    #[must_use]
    pub fn rule(&self, field: Field) -> FieldRule {
        self.rules
            .get(&field)
            .copied()
            .unwrap_or(FieldRule::KeepExisting)
    }

    /// Replace the rule for a field
    ///
    /// # Errors
    /// [`MergeError::InvalidOverride`] if the rule does not apply to the field's type
    pub fn with_override(mut self, field: Field, rule: FieldRule) -> Result<Self, MergeError> {
        if !field.allowed_rules().contains(&rule) {
            return Err(MergeError::InvalidOverride { field, rule });
        }
        self.rules.insert(field, rule);
        Ok(self)
    }

    /// Apply overrides given as `(field path, rule)` pairs
    ///
    /// # Errors
    /// [`MergeError::UnknownField`] or [`MergeError::InvalidOverride`]
    pub fn with_overrides<'a>(
        self,
        overrides: impl IntoIterator<Item = (&'a str, FieldRule)>,
    ) -> Result<Self, MergeError> {
        overrides.into_iter().try_fold(self, |policy, (path, rule)| {
            policy.with_override(path.parse()?, rule)
        })
    }

    /// Iterate `(field, rule)` pairs in record order
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldRule)> + '_ {
        self.rules.iter().map(|(field, rule)| (*field, *rule))
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::standard()
    }
}
