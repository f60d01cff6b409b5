//! Composite evaluation across all five dimensions.
//!
//! [`CompositeEvaluator`] aligns events once, runs every [`Scorer`] over the
//! shared [`ScoringInput`], normalizes each result into a component score in
//! `[0, 1]` (or `None` when not applicable) and averages the available ones.
//!
//! | dimension     | component score                                              |
//! |---------------|--------------------------------------------------------------|
//! | characters    | F1                                                           |
//! | relationships | F1                                                           |
//! | sentiment     | F1                                                           |
//! | action_layer  | mean(complete-match ratio, mean of positive field accuracies) |
//! | text_span     | mean(boundary score, mean overlap)                           |
//!
//! Any dimension flagged `reference_incomplete` scores `None`. A scorer that
//! fails is recorded as [`DimensionResult::Failed`] and scores `None`; the
//! other dimensions are unaffected.
//!
//! # Example
//!
//! ```rust
//! use fabula::eval::composite::CompositeEvaluator;
//! use fabula::eval::types::Dimension;
//! use fabula::{Character, Document};
//!
//! let reference = Document::new().with_characters(vec![
//!     Character::new("牛郎"),
//!     Character::new("织女"),
//! ]);
//! let candidate = Document::new().with_characters(vec![Character::new("牛郎")]);
//!
//! let result = CompositeEvaluator::default().evaluate(&candidate, &reference, None);
//! let characters = result.component(Dimension::Characters).unwrap();
//! assert!((characters - 2.0 / 3.0).abs() < 1e-9);
//! assert_eq!(result.overall_score, characters);
//! ```

use super::action::ActionLayerScorer;
use super::align::{align_events, AlignmentSummary};
use super::character::CharacterScorer;
use super::metrics::mean;
use super::relationship::RelationshipScorer;
use super::sentiment::SentimentScorer;
use super::text_span::TextSpanScorer;
use super::types::{Dimension, DimensionResult, Scorer, ScoringInput};
use crate::config::EvalConfig;
use crate::{Error, Result};
use fabula_core::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which components contributed to the overall score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSummary {
    /// Components with a score.
    pub available: Vec<Dimension>,
    /// Components without a score (incomplete reference or failure).
    pub unavailable: Vec<Dimension>,
    /// Components whose scorer failed.
    pub failed: Vec<Dimension>,
}

/// Full result of one candidate/reference evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Mean of the available component scores, 0.0 when none are available.
    pub overall_score: f64,
    /// Per-dimension score, `None` when not applicable.
    pub component_scores: BTreeMap<Dimension, Option<f64>>,
    /// Per-dimension detail.
    pub detailed_results: BTreeMap<Dimension, DimensionResult>,
    /// How events were aligned.
    pub alignment: AlignmentSummary,
    /// Available and unavailable components.
    pub summary: CompositeSummary,
}

impl CompositeResult {
    /// Score of one component.
    #[must_use]
    pub fn component(&self, dimension: Dimension) -> Option<f64> {
        self.component_scores.get(&dimension).copied().flatten()
    }

    /// Detailed result of one component.
    #[must_use]
    pub fn detail(&self, dimension: Dimension) -> Option<&DimensionResult> {
        self.detailed_results.get(&dimension)
    }

    /// Failed dimensions and their error messages.
    pub fn failures(&self) -> impl Iterator<Item = (Dimension, &str)> + '_ {
        self.detailed_results
            .iter()
            .filter_map(|(d, r)| r.error().map(|e| (*d, e)))
    }
}

/// Normalize one dimension result to `[0, 1]`, or `None` when not applicable.
#[must_use]
pub fn component_score(result: &DimensionResult) -> Option<f64> {
    if result.reference_incomplete() {
        return None;
    }
    match result {
        DimensionResult::Characters(r) => r.f1,
        DimensionResult::Relationships(r) => r.f1,
        DimensionResult::Sentiment(r) => r.f1,
        DimensionResult::ActionLayer(r) => {
            let complete = r.complete_match_ratio?;
            Some(match r.positive_field_mean() {
                Some(fields) => (complete + fields) / 2.0,
                None => complete,
            })
        }
        DimensionResult::TextSpan(r) => Some((r.boundary_score? + r.mean_overlap?) / 2.0),
        DimensionResult::Failed { .. } => None,
    }
}

/// Runs every dimension scorer and combines their results.
pub struct CompositeEvaluator {
    config: EvalConfig,
    scorers: Vec<Box<dyn Scorer>>,
}

impl fmt::Debug for CompositeEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEvaluator")
            .field("config", &self.config)
            .field(
                "scorers",
                &self.scorers.iter().map(|s| s.dimension()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for CompositeEvaluator {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

impl CompositeEvaluator {
    /// The five standard scorers, configured from `config`.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        let scorers: Vec<Box<dyn Scorer>> = vec![
            Box::new(CharacterScorer::new()),
            Box::new(RelationshipScorer::new()),
            Box::new(SentimentScorer::new()),
            Box::new(ActionLayerScorer::new()),
            Box::new(TextSpanScorer::new(config.boundary_tolerance)),
        ];
        Self::with_scorers(config, scorers)
    }

    /// Custom scorer set. Later scorers replace earlier ones for the same
    /// dimension.
    #[must_use]
    pub fn with_scorers(config: EvalConfig, scorers: Vec<Box<dyn Scorer>>) -> Self {
        Self { config, scorers }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate `candidate` against `reference`.
    ///
    /// `text` overrides the story text embedded in either document. Scorer
    /// failures are recorded in the result, never returned.
    #[must_use]
    pub fn evaluate(&self, candidate: &Document, reference: &Document, text: Option<&str>) -> CompositeResult {
        let alignment = align_events(&candidate.narrative_events, &reference.narrative_events);
        let input = ScoringInput::new(candidate, reference, &alignment, text);

        let mut detailed_results = BTreeMap::new();
        for scorer in &self.scorers {
            let dimension = scorer.dimension();
            let result = scorer.score(&input).unwrap_or_else(|e| {
                log::warn!("{} scorer failed: {}", dimension, e);
                DimensionResult::Failed {
                    error: e.to_string(),
                }
            });
            detailed_results.insert(dimension, result);
        }

        let component_scores: BTreeMap<Dimension, Option<f64>> = detailed_results
            .iter()
            .map(|(d, r)| (*d, component_score(r)))
            .collect();

        let mut summary = CompositeSummary::default();
        for (dimension, score) in &component_scores {
            if score.is_some() {
                summary.available.push(*dimension);
            } else {
                summary.unavailable.push(*dimension);
            }
        }
        summary.failed = detailed_results
            .iter()
            .filter(|(_, r)| r.error().is_some())
            .map(|(d, _)| *d)
            .collect();

        let overall_score = mean(component_scores.values().flatten().copied()).unwrap_or(0.0);
        log::debug!(
            "composite: overall={:.4} available={:?} unavailable={:?}",
            overall_score,
            summary.available,
            summary.unavailable
        );

        CompositeResult {
            overall_score,
            component_scores,
            detailed_results,
            alignment: alignment.summary(),
            summary,
        }
    }

    /// Like [`evaluate`](Self::evaluate), but a failing scorer is an error.
    pub fn evaluate_strict(
        &self,
        candidate: &Document,
        reference: &Document,
        text: Option<&str>,
    ) -> Result<CompositeResult> {
        let result = self.evaluate(candidate, reference, text);
        if let Some((dimension, error)) = result.failures().next() {
            return Err(Error::evaluation(format!("{} scorer failed: {}", dimension, error)));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::{ActionField, ActionLayer, Character, NarrativeEvent, Relationship};

    fn full_document() -> Document {
        Document::new()
            .with_text("牛郎放牛。织女织布。二人相会。")
            .with_characters(vec![
                Character::new("牛郎").with_archetype("Hero"),
                Character::new("织女").with_archetype("Lover"),
            ])
            .with_events(vec![
                NarrativeEvent::new()
                    .with_id("e1")
                    .with_time_order(1.0)
                    .with_span(0, 5)
                    .with_participants(&["牛郎"], &["牛"])
                    .with_action_layer(
                        ActionLayer::default()
                            .with(ActionField::Category, "Daily")
                            .with(ActionField::Status, "success"),
                    ),
                NarrativeEvent::new()
                    .with_id("e2")
                    .with_time_order(2.0)
                    .with_span(5, 15)
                    .with_participants(&["牛郎"], &["织女"])
                    .with_relationship(
                        Relationship::new("牛郎", "织女")
                            .with_levels("romantic", "lover")
                            .with_sentiment("romantic"),
                    ),
            ])
    }

    #[test]
    fn test_identical_documents_score_one() {
        let doc = full_document();
        let result = CompositeEvaluator::default().evaluate(&doc, &doc, None);
        for dimension in Dimension::ALL {
            assert_eq!(result.component(dimension), Some(1.0), "{}", dimension);
        }
        assert_eq!(result.overall_score, 1.0);
        assert_eq!(result.summary.available.len(), 5);
    }

    #[test]
    fn test_missing_text_isolated() {
        let mut doc = full_document();
        doc.source_info.text_content = None;
        let result = CompositeEvaluator::default().evaluate(&doc, &doc, None);
        assert_eq!(result.component(Dimension::TextSpan), None);
        assert!(result.detail(Dimension::TextSpan).unwrap().error().is_some());
        assert_eq!(result.summary.failed, vec![Dimension::TextSpan]);
        assert_eq!(result.component(Dimension::Characters), Some(1.0));
        assert_eq!(result.overall_score, 1.0);

        let err = CompositeEvaluator::default()
            .evaluate_strict(&doc, &doc, None)
            .unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));
    }

    #[test]
    fn test_explicit_text_wins() {
        let mut doc = full_document();
        doc.source_info.text_content = None;
        let result = CompositeEvaluator::default().evaluate(&doc, &doc, Some("牛郎放牛。织女织布。二人相会。"));
        assert_eq!(result.component(Dimension::TextSpan), Some(1.0));
    }

    #[test]
    fn test_all_null_gives_zero() {
        let empty = Document::new();
        let result = CompositeEvaluator::default().evaluate(&empty, &empty, None);
        assert_eq!(result.overall_score, 0.0);
        assert!(result.summary.available.is_empty());
        assert!(result.summary.failed.is_empty());
    }

    #[test]
    fn test_all_wrong_action_fields_use_complete_ratio() {
        let reference = Document::new().with_events(vec![NarrativeEvent::new()
            .with_id("e1")
            .with_action_layer(ActionLayer::default().with(ActionField::Status, "success"))]);
        let candidate = Document::new().with_events(vec![NarrativeEvent::new()
            .with_id("e1")
            .with_action_layer(ActionLayer::default().with(ActionField::Status, "failure"))]);
        let result = CompositeEvaluator::default().evaluate(&candidate, &reference, None);
        assert_eq!(result.component(Dimension::ActionLayer), Some(0.0));
    }

    #[test]
    fn test_partial_action_layer_component() {
        let reference = Document::new().with_events(vec![NarrativeEvent::new().with_id("e1").with_action_layer(
            ActionLayer::default()
                .with(ActionField::Category, "Physical & Conflict")
                .with(ActionField::Status, "success"),
        )]);
        let candidate = Document::new().with_events(vec![NarrativeEvent::new().with_id("e1").with_action_layer(
            ActionLayer::default()
                .with(ActionField::Category, "Physical & Conflict")
                .with(ActionField::Status, "failure"),
        )]);
        let result = CompositeEvaluator::default().evaluate(&candidate, &reference, None);
        // complete ratio 0.0, positive field mean 1.0 (status 0.0 excluded)
        assert_eq!(result.component(Dimension::ActionLayer), Some(0.5));
    }
}
