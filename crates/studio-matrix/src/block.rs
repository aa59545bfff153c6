//! Matrix cells and rows
//!
//! [`CodeBlock`] is the cell at (language, approach); [`LanguageRow`] is the
//! ordered list of cells authored for one language.

use crate::approach::ApproachKey;
use crate::language::Language;
use im::Vector;
use serde::{Deserialize, Deserializer, Serialize};

fn visible_by_default() -> bool {
    true
}

/// Treat `null` as the type's default
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treat `null` as shown
fn nullable_visible<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Cell at (language, approach)
///
/// # Invariants
/// - `explanation_before` / `explanation_after` are approach-scoped: every
///   cell sharing an approach key carries the same text for both fields.
///   `code` is independent per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    /// Approach this cell implements
    #[serde(rename = "codeType", default)]
    pub approach: ApproachKey,

    /// Opaque source text
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,

    /// Prose shown before the code
    #[serde(default, deserialize_with = "nullable")]
    pub explanation_before: String,

    /// Prose shown after the code
    #[serde(default, deserialize_with = "nullable")]
    pub explanation_after: String,

    /// Whether the cell is shown to readers
    #[serde(default = "visible_by_default", deserialize_with = "nullable_visible")]
    pub visible: bool,

    /// Whether the explanations are shown to readers
    #[serde(default = "visible_by_default", deserialize_with = "nullable_visible")]
    pub explanation_visible: bool,
}

impl CodeBlock {
    /// Create empty, visible cell for an approach
    #[inline]
    #[must_use]
    pub fn empty(approach: ApproachKey) -> Self {
        Self {
            approach,
            code: String::new(),
            explanation_before: String::new(),
            explanation_after: String::new(),
            visible: true,
            explanation_visible: true,
        }
    }

    /// Builder: set code text
    #[inline]
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Builder: set one explanation field
    #[inline]
    #[must_use]
    pub fn with_explanation(mut self, field: ExplanationField, text: impl Into<String>) -> Self {
        field.set(&mut self, text.into());
        self
    }
}

/// Which of the two approach-scoped explanation fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplanationField {
    /// `explanationBefore`
    Before,

    /// `explanationAfter`
    After,
}

impl ExplanationField {
    /// Both fields
    pub const ALL: [Self; 2] = [Self::Before, Self::After];

    /// Read field from cell
    #[inline]
    #[must_use]
    pub fn get(self, block: &CodeBlock) -> &str {
        match self {
            Self::Before => &block.explanation_before,
            Self::After => &block.explanation_after,
        }
    }

    /// Write field on cell
    #[inline]
    pub fn set(self, block: &mut CodeBlock, text: String) {
        match self {
            Self::Before => block.explanation_before = text,
            Self::After => block.explanation_after = text,
        }
    }

    /// Wire name of the field
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Before => "explanationBefore",
            Self::After => "explanationAfter",
        }
    }
}

/// Ordered cells authored for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRow {
    /// Row language
    #[serde(rename = "lang", default)]
    pub language: Language,

    /// Cells in display order
    #[serde(rename = "code", default, deserialize_with = "nullable")]
    pub blocks: Vector<CodeBlock>,
}

impl LanguageRow {
    /// Create row with no cells
    #[inline]
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            blocks: Vector::new(),
        }
    }

    /// Create row with one empty cell per approach
    #[must_use]
    pub fn with_approaches<'a>(
        language: Language,
        approaches: impl IntoIterator<Item = &'a ApproachKey>,
    ) -> Self {
        let blocks = approaches
            .into_iter()
            .map(|key| CodeBlock::empty(key.clone()))
            .collect();
        Self { language, blocks }
    }

    /// Builder: append a cell
    #[must_use]
    pub fn with_block(mut self, block: CodeBlock) -> Self {
        self.blocks.push_back(block);
        self
    }

    /// Position of an approach within this row
    #[inline]
    #[must_use]
    pub fn position(&self, approach: &ApproachKey) -> Option<usize> {
        self.blocks.iter().position(|b| &b.approach == approach)
    }

    /// Check if the row holds a cell for the approach
    #[inline]
    #[must_use]
    pub fn contains(&self, approach: &ApproachKey) -> bool {
        self.position(approach).is_some()
    }

    /// Cell for an approach
    #[inline]
    #[must_use]
    pub fn block(&self, approach: &ApproachKey) -> Option<&CodeBlock> {
        self.blocks.iter().find(|b| &b.approach == approach)
    }

    /// Approach keys in row order
    pub fn approaches(&self) -> impl Iterator<Item = &ApproachKey> {
        self.blocks.iter().map(|b| &b.approach)
    }
}
