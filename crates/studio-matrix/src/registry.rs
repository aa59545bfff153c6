//! Approach key registry
//!
//! Derived, never-stored views over an [`ImplementationMatrix`]: the ordered
//! union of approach keys and per-approach coverage.

use crate::approach::ApproachKey;
use crate::language::Language;
use crate::matrix::ImplementationMatrix;
use std::collections::HashSet;

/// Stateless view computing approach order from a matrix snapshot
///
/// Recomputed on every call so it cannot drift from the rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproachKeyRegistry;

impl ApproachKeyRegistry {
    /// Ordered union of approach keys
    ///
    /// First-seen order, scanning rows in registration order and each row's
    /// cells in row order.
    #[must_use]
    pub fn order(matrix: &ImplementationMatrix) -> ApproachOrder {
        let mut seen = HashSet::new();
        let keys = matrix
            .rows()
            .flat_map(|row| row.approaches())
            .filter(|key| seen.insert(*key))
            .cloned()
            .collect();
        ApproachOrder(keys)
    }

    /// Which languages hold or miss each approach, in approach order
    #[must_use]
    pub fn coverage(matrix: &ImplementationMatrix) -> Vec<ApproachCoverage> {
        Self::order(matrix)
            .into_iter()
            .map(|approach| {
                let (present, missing): (Vec<_>, Vec<_>) =
                    matrix.rows().partition(|row| row.contains(&approach));
                ApproachCoverage {
                    present: present.into_iter().map(|r| r.language.clone()).collect(),
                    missing: missing.into_iter().map(|r| r.language.clone()).collect(),
                    approach,
                }
            })
            .collect()
    }
}

/// Direction of an approach reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the front of the order
    Left,

    /// Towards the back of the order
    Right,
}

/// Ordered list of every approach key in a matrix
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApproachOrder(Vec<ApproachKey>);

impl ApproachOrder {
    /// Keys in order
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[ApproachKey] {
        &self.0
    }

    /// Number of distinct approaches
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no approach exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if key is in the union
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ApproachKey) -> bool {
        self.0.contains(key)
    }

    /// Position of key in the order
    #[inline]
    #[must_use]
    pub fn position(&self, key: &ApproachKey) -> Option<usize> {
        self.0.iter().position(|k| k == key)
    }

    /// Adjacent key in the requested direction
    ///
    /// `None` when `key` is unknown or already at that boundary.
    #[must_use]
    pub fn neighbor(&self, key: &ApproachKey, direction: Direction) -> Option<&ApproachKey> {
        let index = self.position(key)?;
        let target = match direction {
            Direction::Left => index.checked_sub(1)?,
            Direction::Right => index + 1,
        };
        self.0.get(target)
    }

    /// Iterate keys
    pub fn iter(&self) -> impl Iterator<Item = &ApproachKey> {
        self.0.iter()
    }
}

impl IntoIterator for ApproachOrder {
    type Item = ApproachKey;
    type IntoIter = std::vec::IntoIter<ApproachKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Coverage of one approach across language rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproachCoverage {
    /// The approach
    pub approach: ApproachKey,

    /// Languages holding a cell for it
    pub present: Vec<Language>,

    /// Languages without a cell ("missing", informational)
    pub missing: Vec<Language>,
}

impl ApproachCoverage {
    /// Check if every row holds the approach
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{CodeBlock, LanguageRow};

    fn row(lang: &str, keys: &[&str]) -> LanguageRow {
        keys.iter().fold(LanguageRow::new(Language::new(lang)), |row, key| {
            row.with_block(CodeBlock::empty(ApproachKey::from(*key)))
        })
    }

    fn keys(order: &ApproachOrder) -> Vec<&str> {
        order.iter().map(ApproachKey::as_str).collect()
    }

    #[test]
    fn order_is_first_seen_union() {
        let matrix = ImplementationMatrix::from_rows([
            row("typescript", &["optimize", "bruteforce"]),
            row("python", &["starter", "optimize", "dp"]),
        ]);

        let order = ApproachKeyRegistry::order(&matrix);
        assert_eq!(keys(&order), vec!["optimize", "bruteforce", "starter", "dp"]);
    }

    #[test]
    fn order_of_empty_matrix_is_empty() {
        let order = ApproachKeyRegistry::order(&ImplementationMatrix::new());
        assert!(order.is_empty());
    }

    #[test]
    fn neighbor_respects_boundaries() {
        let matrix = ImplementationMatrix::from_rows([row("java", &["a", "b", "c"])]);
        let order = ApproachKeyRegistry::order(&matrix);

        let a = ApproachKey::from("a");
        let c = ApproachKey::from("c");
        assert_eq!(order.neighbor(&a, Direction::Left), None);
        assert_eq!(order.neighbor(&a, Direction::Right), Some(&ApproachKey::from("b")));
        assert_eq!(order.neighbor(&c, Direction::Right), None);
        assert_eq!(order.neighbor(&ApproachKey::from("zzz"), Direction::Left), None);
    }

    #[test]
    fn coverage_reports_missing_rows() {
        let matrix = ImplementationMatrix::from_rows([
            row("typescript", &["optimize", "bruteforce"]),
            row("python", &["optimize"]),
        ]);

        let coverage = ApproachKeyRegistry::coverage(&matrix);
        assert_eq!(coverage.len(), 2);
        assert!(coverage[0].is_complete());
        assert_eq!(coverage[1].approach.as_str(), "bruteforce");
        assert_eq!(coverage[1].missing, vec![Language::new("python")]);
    }
}
