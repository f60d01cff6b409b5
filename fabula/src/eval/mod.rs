//! Annotation evaluation engine.
//!
//! # Overview
//!
//! A candidate annotation is scored against a reference annotation on five
//! dimensions, each by its own [`Scorer`](types::Scorer):
//!
//! | Dimension     | Scorer                                  | Compares                          |
//! |---------------|-----------------------------------------|-----------------------------------|
//! | characters    | [`character::CharacterScorer`]          | character names, aliases, archetypes |
//! | relationships | [`relationship::RelationshipScorer`]    | `(agent, target)` pairs and levels |
//! | sentiment     | [`sentiment::SentimentScorer`]          | sentiment labels and polarity      |
//! | action_layer  | [`action::ActionLayerScorer`]           | the five action fields             |
//! | text_span     | [`text_span::TextSpanScorer`]           | sentence boundaries and overlap    |
//!
//! The event-based scorers read one shared [`align::EventAlignment`]: each
//! candidate event is paired with at most one reference event by `id`, else by
//! `time_order`.
//!
//! # Incomplete references
//!
//! References are partially annotated. Every scorer routes blank-versus-filled
//! decisions through [`policy::classify`]: a candidate value where the
//! reference is blank is never penalized, and a dimension with no reference
//! data reports `reference_incomplete` and scores `None` rather than 0.
//!
//! # Example
//!
//! ```rust
//! use fabula::eval::prelude::*;
//! use fabula::{Character, Document};
//!
//! let reference = Document::new().with_characters(vec![
//!     Character::new("牛郎"),
//!     Character::new("织女"),
//!     Character::new("老牛"),
//! ]);
//! let candidate = Document::new().with_characters(vec![
//!     Character::new("牛郎"),
//!     Character::new("织女"),
//! ]);
//!
//! let result = CompositeEvaluator::default().evaluate(&candidate, &reference, None);
//! assert!((result.overall_score - 0.8).abs() < 1e-9);
//! assert_eq!(result.component(Dimension::Sentiment), None);
//! ```
//!
//! # Modules
//!
//! - Building blocks: [`metrics`], [`policy`], [`matcher`], [`align`], [`segmentation`]
//! - Scorers: [`character`], [`relationship`], [`sentiment`], [`action`], [`text_span`]
//! - Aggregation: [`composite`], [`corpus`]
//! - Output and checks: [`report`], [`validation`]

pub mod action;
pub mod align;
pub mod character;
pub mod composite;
pub mod corpus;
pub mod matcher;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod relationship;
pub mod report;
pub mod segmentation;
pub mod sentiment;
pub mod text_span;
pub mod types;
pub mod validation;

pub use composite::{CompositeEvaluator, CompositeResult};
pub use corpus::{evaluate_corpus, BatchReport, CorpusItem, CorpusSummary};
pub use types::{Dimension, DimensionResult, Scorer, ScoringInput};
