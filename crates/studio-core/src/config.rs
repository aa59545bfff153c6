//! Studio configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! default_approaches = ["optimize", "starter"]
//! sync_explanations_on_merge = true
//!
//! [language_labels]
//! elixir = "Elixir"
//!
//! [merge.overrides]
//! "metadata.overview" = "keep_existing"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use studio_matrix::{ApproachKey, LanguageTable, DEFAULT_APPROACHES};
use studio_merge::{FieldRule, MergeEngine, MergeError, MergePolicy};

/// Edit session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Approaches seeded into the first language row of an empty matrix
    pub default_approaches: Vec<String>,

    /// Extra canonical language labels (spelling → label)
    pub language_labels: BTreeMap<String, String>,

    /// Merge policy settings
    pub merge: MergeConfig,

    /// Re-broadcast incoming approach explanations after an implementations merge
    pub sync_explanations_on_merge: bool,
}

/// Merge policy settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Field path → rule replacing the standard table entry
    pub overrides: BTreeMap<String, FieldRule>,
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default approaches
    #[must_use]
    pub fn with_default_approaches<I, S>(mut self, approaches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_approaches = approaches.into_iter().map(Into::into).collect();
        self
    }

    /// With an extra language label
    #[must_use]
    pub fn with_language_label(mut self, spelling: impl Into<String>, label: impl Into<String>) -> Self {
        self.language_labels.insert(spelling.into(), label.into());
        self
    }

    /// With a merge rule override
    #[must_use]
    pub fn with_merge_override(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.merge.overrides.insert(field.into(), rule);
        self
    }

    /// With explanation sync on merge
    #[inline]
    #[must_use]
    pub fn with_explanation_sync(mut self, enabled: bool) -> Self {
        self.sync_explanations_on_merge = enabled;
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// - [`ConfigError::Toml`] for malformed TOML
    /// - [`ConfigError::Merge`] for unknown fields or rules a field cannot use
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.merge_policy()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, else see [`from_toml_str`](Self::from_toml_str)
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Normalized default approach keys; blanks are dropped
    #[must_use]
    pub fn approach_keys(&self) -> Vec<ApproachKey> {
        let keys: Vec<_> = self
            .default_approaches
            .iter()
            .filter_map(|raw| ApproachKey::parse(raw))
            .collect();
        if keys.is_empty() {
            ApproachKey::defaults()
        } else {
            keys
        }
    }

    /// Built-in language table extended with configured labels
    #[must_use]
    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::builtin().with_entries(
            self.language_labels
                .iter()
                .map(|(spelling, label)| (spelling.as_str(), label.as_str())),
        )
    }

    /// Standard policy table with configured overrides applied
    ///
    /// # Errors
    /// [`MergeError::UnknownField`] or [`MergeError::InvalidOverride`]
    pub fn merge_policy(&self) -> Result<MergePolicy, MergeError> {
        MergePolicy::standard().with_overrides(
            self.merge
                .overrides
                .iter()
                .map(|(path, rule)| (path.as_str(), *rule)),
        )
    }

    /// Merge engine configured from these settings
    ///
    /// # Errors
    /// See [`merge_policy`](Self::merge_policy)
    pub fn merge_engine(&self) -> Result<MergeEngine, MergeError> {
        Ok(MergeEngine::new()
            .with_policy(self.merge_policy()?)
            .with_language_table(self.language_table())
            .with_explanation_sync(self.sync_explanations_on_merge))
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_approaches: DEFAULT_APPROACHES.iter().map(ToString::to_string).collect(),
            language_labels: BTreeMap::new(),
            merge: MergeConfig::default(),
            sync_explanations_on_merge: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid merge override
    #[error("invalid merge override: {0}")]
    Merge(#[from] MergeError),
}
