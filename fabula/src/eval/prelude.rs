//! Evaluation prelude - commonly used types for quick imports.
//!
//! ```rust
//! use fabula::eval::prelude::*;
//! ```
//!
//! Brings in the composite evaluator and its result types, corpus batch
//! evaluation, report renderers and validation. Individual scorers and their
//! result records live in their own modules.

pub use super::composite::{CompositeEvaluator, CompositeResult, CompositeSummary};
pub use super::corpus::{
    evaluate_corpus, BatchReport, CorpusItem, CorpusSummary, DocumentFailure, DocumentOutcome,
};
pub use super::report::{render_corpus_markdown, render_json, render_markdown};
pub use super::types::{Dimension, DimensionResult, ScoreSpread, Scorer, ScoringInput};
pub use super::validation::{validate_document, ValidationReport};

pub use crate::config::EvalConfig;
pub use crate::taxonomy::Taxonomies;
