//! Story annotation documents ("JSON v3").
//!
//! A [`Document`] describes one short story as a list of [`Character`]s and a
//! sequence of [`NarrativeEvent`]s. Two documents are compared at a time: the
//! *candidate* (usually model output) and the *reference* (human annotation).
//!
//! # Loading
//!
//! Loading is deliberately forgiving. Optional fields with the wrong JSON type
//! are read as absent, and list elements that are not objects are dropped, so
//! one malformed record cannot abort a corpus-wide evaluation. Only a root
//! value that is not a JSON object is rejected.
//!
//! ```rust
//! use fabula_core::Document;
//!
//! let doc = Document::from_json_str(r#"{
//!     "characters": [{"name": "牛郎", "alias": "牛哥;阿牛", "archetype": "Hero"}],
//!     "narrative_events": [{"id": "e1", "time_order": 1, "agents": "牛郎"}],
//!     "source_info": {"text_content": "牛郎放牛。"}
//! }"#).unwrap();
//!
//! assert_eq!(doc.characters[0].alias, vec!["牛哥", "阿牛"]);
//! assert_eq!(doc.narrative_events[0].agents, vec!["牛郎"]);
//! assert_eq!(doc.text(), Some("牛郎放牛。"));
//! ```

use crate::lenient;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

// =============================================================================
// Document
// =============================================================================

/// A complete story annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Characters appearing in the story.
    #[serde(default, deserialize_with = "lenient::list_of")]
    pub characters: Vec<Character>,
    /// Narrative events in annotation order.
    #[serde(default, deserialize_with = "lenient::list_of")]
    pub narrative_events: Vec<NarrativeEvent>,
    /// Where the story came from, including its raw text.
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub source_info: SourceInfo,
    /// Free-form metadata, preserved untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

/// Provenance of the annotated story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Raw story text that `text_span` offsets point into.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_content: Option<String>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build a document from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::parse("document root must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Read and parse a document file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
            .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Embedded story text, if present and not blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.source_info
            .text_content
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Set the characters.
    #[must_use]
    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters = characters;
        self
    }

    /// Set the narrative events.
    #[must_use]
    pub fn with_events(mut self, events: Vec<NarrativeEvent>) -> Self {
        self.narrative_events = events;
        self
    }

    /// Set the embedded story text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.source_info.text_content = Some(text.into());
        self
    }
}

// =============================================================================
// Character
// =============================================================================

/// A story character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Canonical name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Alternative names. Accepts a list or a semicolon-separated string.
    #[serde(
        default,
        deserialize_with = "lenient::aliases",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alias: Vec<String>,
    /// Coarse role label (Hero, Villain, Mentor, ...).
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub archetype: Option<String>,
}

impl Character {
    /// Create a character with no aliases or archetype.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set aliases from a semicolon-separated string.
    #[must_use]
    pub fn with_aliases(mut self, aliases: &str) -> Self {
        self.alias = lenient::split_aliases(aliases);
        self
    }

    /// Trimmed, non-empty alias literals in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> + '_ {
        self.alias.iter().map(|a| a.trim()).filter(|a| !a.is_empty())
    }

    /// Set the archetype.
    #[must_use]
    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }
}

// =============================================================================
// Narrative events
// =============================================================================

/// One unit of story action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    /// Annotation id, used for alignment.
    #[serde(
        default,
        deserialize_with = "lenient::opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Position in story time, used for alignment when ids disagree.
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_order: Option<f64>,
    /// Where the event occurs in the raw text.
    #[serde(
        default,
        deserialize_with = "lenient::opt_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_span: Option<TextSpan>,
    /// Characters performing the action.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub agents: Vec<String>,
    /// Characters or objects acted upon.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub targets: Vec<String>,
    /// Kind of target (character, object, ...).
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_type: Option<String>,
    /// Instrument used, if any.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub instrument: Option<String>,
    /// Relationships between participants.
    #[serde(default, deserialize_with = "lenient::list_of")]
    pub relationships: Vec<Relationship>,
    /// Action classification.
    #[serde(
        default,
        deserialize_with = "lenient::opt_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub action_layer: Option<ActionLayer>,
}

impl NarrativeEvent {
    /// Create an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the time order.
    #[must_use]
    pub fn with_time_order(mut self, time_order: f64) -> Self {
        self.time_order = Some(time_order);
        self
    }

    /// Set the text span offsets.
    #[must_use]
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.text_span = Some(TextSpan::new(start, end));
        self
    }

    /// Set agents and targets.
    #[must_use]
    pub fn with_participants(mut self, agents: &[&str], targets: &[&str]) -> Self {
        self.agents = agents.iter().map(|s| s.to_string()).collect();
        self.targets = targets.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append a relationship.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Set the action layer.
    #[must_use]
    pub fn with_action_layer(mut self, action_layer: ActionLayer) -> Self {
        self.action_layer = Some(action_layer);
        self
    }

    /// Short human-readable handle for logs and reports.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.id, self.time_order) {
            (Some(id), _) => id.clone(),
            (None, Some(t)) => format!("t={}", t),
            (None, None) => "?".to_string(),
        }
    }
}

/// Character-offset range `[start, end)` into the story text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Start offset (inclusive).
    #[serde(default, deserialize_with = "lenient::opt_offset")]
    pub start: Option<usize>,
    /// End offset (exclusive).
    #[serde(default, deserialize_with = "lenient::opt_offset")]
    pub end: Option<usize>,
    /// Covered text, as annotated.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
}

impl TextSpan {
    /// Create a span without covered text.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            text: None,
        }
    }

    /// `(start, end)` when both offsets are present.
    #[must_use]
    pub fn range(&self) -> Option<(usize, usize)> {
        Some((self.start?, self.end?))
    }
}

/// Directed relationship between two participants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source participant.
    #[serde(default, deserialize_with = "lenient::string")]
    pub agent: String,
    /// Target participant.
    #[serde(default, deserialize_with = "lenient::string")]
    pub target: String,
    /// Coarse relationship class.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub relationship_level1: Option<String>,
    /// Fine relationship class.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub relationship_level2: Option<String>,
    /// Sentiment label of agent toward target.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment: Option<String>,
}

impl Relationship {
    /// Create a relationship with only participants set.
    #[must_use]
    pub fn new(agent: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Set both relationship levels.
    #[must_use]
    pub fn with_levels(mut self, level1: impl Into<String>, level2: impl Into<String>) -> Self {
        self.relationship_level1 = Some(level1.into());
        self.relationship_level2 = Some(level2.into());
        self
    }

    /// Set the sentiment label.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: impl Into<String>) -> Self {
        self.sentiment = Some(sentiment.into());
        self
    }

    /// Matching identity: trimmed, lower-cased `(agent, target)`.
    #[must_use]
    pub fn key(&self) -> (String, String) {
        (
            self.agent.trim().to_lowercase(),
            self.target.trim().to_lowercase(),
        )
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.agent, self.target)
    }
}

// =============================================================================
// Action layer
// =============================================================================

/// The five independent action classification fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionField {
    /// Broad action category ("Physical & Conflict", ...).
    Category,
    /// Action type within the category.
    Type,
    /// Narrative context.
    Context,
    /// Outcome status (success, failure, ...).
    Status,
    /// Narrative function.
    Function,
}

impl ActionField {
    /// All fields in declaration order.
    pub const ALL: [ActionField; 5] = [
        ActionField::Category,
        ActionField::Type,
        ActionField::Context,
        ActionField::Status,
        ActionField::Function,
    ];

    /// JSON field name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionField::Category => "category",
            ActionField::Type => "type",
            ActionField::Context => "context",
            ActionField::Status => "status",
            ActionField::Function => "function",
        }
    }
}

impl fmt::Display for ActionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action classification of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLayer {
    /// See [`ActionField::Category`].
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    /// See [`ActionField::Type`].
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub action_type: Option<String>,
    /// See [`ActionField::Context`].
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub context: Option<String>,
    /// See [`ActionField::Status`].
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    /// See [`ActionField::Function`].
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub function: Option<String>,
}

impl ActionLayer {
    /// Raw value of one field.
    #[must_use]
    pub fn get(&self, field: ActionField) -> Option<&str> {
        match field {
            ActionField::Category => self.category.as_deref(),
            ActionField::Type => self.action_type.as_deref(),
            ActionField::Context => self.context.as_deref(),
            ActionField::Status => self.status.as_deref(),
            ActionField::Function => self.function.as_deref(),
        }
    }

    /// Set one field.
    #[must_use]
    pub fn with(mut self, field: ActionField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            ActionField::Category => self.category = value,
            ActionField::Type => self.action_type = value,
            ActionField::Context => self.context = value,
            ActionField::Status => self.status = value,
            ActionField::Function => self.function = value,
        }
        self
    }

    /// True when no field carries a non-blank value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        ActionField::ALL
            .iter()
            .all(|f| self.get(*f).map_or(true, |v| v.trim().is_empty()))
    }
}
