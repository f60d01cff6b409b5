//! Evaluation configuration.
//!
//! Everything the engine can be tuned with lives in one [`EvalConfig`],
//! passed explicitly at construction. Nothing is read from global paths.
//!
//! ```toml
//! boundary_tolerance = 3
//!
//! [taxonomies]
//! characters = "taxonomies/archetypes.json"
//! sentiment = "taxonomies/sentiment.json"
//! ```
//!
//! Relative taxonomy paths in a file loaded with [`EvalConfig::from_path`] are
//! resolved against the directory containing that file.

use crate::eval::segmentation::DEFAULT_TOLERANCE;
use crate::taxonomy::Taxonomies;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional vocabulary files, used only for validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxonomyPaths {
    /// Character archetypes.
    pub characters: Option<PathBuf>,
    /// Relationship classes (level 1 and level 2).
    pub relationships: Option<PathBuf>,
    /// Sentiment labels.
    pub sentiment: Option<PathBuf>,
    /// Action layer values.
    pub action: Option<PathBuf>,
}

impl TaxonomyPaths {
    /// True when no taxonomy file is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_none()
            && self.relationships.is_none()
            && self.sentiment.is_none()
            && self.action.is_none()
    }

    fn resolve_against(&mut self, base: &Path) {
        for path in [
            &mut self.characters,
            &mut self.relationships,
            &mut self.sentiment,
            &mut self.action,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Sentences a boundary may be off by and still match.
    pub boundary_tolerance: usize,
    /// Vocabulary files for validation.
    pub taxonomies: TaxonomyPaths,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            boundary_tolerance: DEFAULT_TOLERANCE,
            taxonomies: TaxonomyPaths::default(),
        }
    }
}

impl EvalConfig {
    /// Start a builder from defaults.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }

    /// Parse TOML. Missing keys keep their defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::config(format!("invalid configuration: {}", e)))
    }

    /// Read a TOML file, resolving relative taxonomy paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config: Self = toml::from_str(&text).map_err(|e| {
            Error::config(format!("{}: invalid configuration: {}", path.display(), e))
        })?;
        if let Some(base) = path.parent() {
            config.taxonomies.resolve_against(base);
        }
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(format!("cannot serialize configuration: {}", e)))
    }

    /// Load every configured taxonomy file.
    pub fn load_taxonomies(&self) -> Result<Taxonomies> {
        Taxonomies::load(&self.taxonomies)
    }
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Clone, Default)]
pub struct EvalConfigBuilder {
    config: EvalConfig,
}

impl EvalConfigBuilder {
    /// Set the boundary tolerance.
    #[must_use]
    pub fn boundary_tolerance(mut self, tolerance: usize) -> Self {
        self.config.boundary_tolerance = tolerance;
        self
    }

    /// Set the character archetype vocabulary file.
    #[must_use]
    pub fn characters_taxonomy(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.taxonomies.characters = Some(path.into());
        self
    }

    /// Set the relationship vocabulary file.
    #[must_use]
    pub fn relationships_taxonomy(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.taxonomies.relationships = Some(path.into());
        self
    }

    /// Set the sentiment vocabulary file.
    #[must_use]
    pub fn sentiment_taxonomy(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.taxonomies.sentiment = Some(path.into());
        self
    }

    /// Set the action vocabulary file.
    #[must_use]
    pub fn action_taxonomy(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.taxonomies.action = Some(path.into());
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> EvalConfig {
        self.config
    }
}
