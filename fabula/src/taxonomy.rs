//! Label vocabularies.
//!
//! Taxonomy files are JSON of any shape. Every string leaf and every object
//! key becomes a vocabulary entry, so both a flat list and a nested
//! category tree work:
//!
//! ```json
//! {"Physical & Conflict": ["attack", "defend"], "Social": {"greet": "..."}}
//! ```
//!
//! Vocabularies are only consulted by validation. Scoring never needs them.

use crate::config::TaxonomyPaths;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// A set of known labels, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    entries: BTreeSet<String>,
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn collect(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => {
            let s = normalize(s);
            if !s.is_empty() {
                out.insert(s);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
        Value::Object(map) => {
            for (key, v) in map {
                let key = normalize(key);
                if !key.is_empty() {
                    out.insert(key);
                }
                collect(v, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

impl Vocabulary {
    /// Build from explicit labels.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: labels
                .into_iter()
                .map(|l| normalize(l.as_ref()))
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    /// Build from a parsed taxonomy document.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut entries = BTreeSet::new();
        collect(value, &mut entries);
        Self { entries }
    }

    /// Read a taxonomy file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read taxonomy {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            Error::config(format!("taxonomy {} is not valid JSON: {}", path.display(), e))
        })?;
        let vocabulary = Self::from_value(&value);
        log::debug!(
            "loaded {} taxonomy entries from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    /// Whether `label` is known.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains(&normalize(label))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four optional vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomies {
    /// Character archetypes.
    pub characters: Option<Vocabulary>,
    /// Relationship classes.
    pub relationships: Option<Vocabulary>,
    /// Sentiment labels.
    pub sentiment: Option<Vocabulary>,
    /// Action layer values.
    pub action: Option<Vocabulary>,
}

impl Taxonomies {
    /// Load every configured file. Unconfigured vocabularies stay `None`.
    pub fn load(paths: &TaxonomyPaths) -> Result<Self> {
        let load = |p: &Option<std::path::PathBuf>| p.as_ref().map(Vocabulary::from_path).transpose();
        Ok(Self {
            characters: load(&paths.characters)?,
            relationships: load(&paths.relationships)?,
            sentiment: load(&paths.sentiment)?,
            action: load(&paths.action)?,
        })
    }

    /// True when no vocabulary is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_none()
            && self.relationships.is_none()
            && self.sentiment.is_none()
            && self.action.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys_and_leaves() {
        let vocab = Vocabulary::from_value(&json!({
            "Physical & Conflict": ["attack", "Defend"],
            "Social": {"greet": {"description": 3}},
            "ignored": [1, true, null]
        }));
        for label in ["physical & conflict", "ATTACK", "defend", "social", "greet", "description", "ignored"] {
            assert!(vocab.contains(label), "missing {}", label);
        }
        assert!(!vocab.contains("flee"));
    }

    #[test]
    fn test_flat_list() {
        let vocab = Vocabulary::from_value(&json!(["romantic", " hostile ", ""]));
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains("Hostile"));
    }

    #[test]
    fn test_unconfigured_is_none() {
        let taxonomies = Taxonomies::load(&TaxonomyPaths::default()).unwrap();
        assert!(taxonomies.is_empty());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let paths = TaxonomyPaths {
            sentiment: Some("/nonexistent/sentiment.json".into()),
            ..TaxonomyPaths::default()
        };
        assert!(matches!(Taxonomies::load(&paths), Err(Error::Config(_))));
    }
}
