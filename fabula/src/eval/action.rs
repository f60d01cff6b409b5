//! Action-layer scoring.
//!
//! The five action fields are scored independently on aligned events. A
//! field counts only where the reference fills it in; a blank candidate value
//! against a filled reference value is wrong.
//!
//! Events are also classified as a whole: a *complete* match gets every
//! evaluated field right, a *partial* match gets at least one right.

use super::align::EventAlignment;
use super::metrics::{mean, ratio};
use super::policy::{classify, classify_field, PolicyOutcome};
use super::types::{Dimension, DimensionResult, Scorer, ScoringInput};
use crate::Result;
use fabula_core::{ActionField, ActionLayer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Correct / total for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldAccuracy {
    /// `None` when the reference never filled the field.
    pub accuracy: Option<f64>,
    /// Events where the candidate value equals the reference value.
    pub correct: usize,
    /// Events where the reference filled the field.
    pub total: usize,
}

/// An evaluated field the candidate got wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMismatch {
    /// Event label.
    pub event: String,
    /// Field name.
    pub field: ActionField,
    /// Candidate value, if any.
    pub candidate: Option<String>,
    /// Reference value.
    pub reference: String,
}

/// Action-layer scorer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLayerResult {
    /// Per-field accuracy, all five fields present.
    pub fields: BTreeMap<ActionField, FieldAccuracy>,
    /// Events with at least one evaluable field.
    pub n_events_evaluated: usize,
    /// Events where only the candidate has an action layer.
    pub n_events_skipped: usize,
    /// Candidate events with no reference counterpart.
    pub n_events_unaligned: usize,
    /// Evaluated events with every field correct.
    pub complete_matches: usize,
    /// Evaluated events with some but not all fields correct.
    pub partial_matches: usize,
    /// `complete_matches / n_events_evaluated`.
    pub complete_match_ratio: Option<f64>,
    /// `partial_matches / n_events_evaluated`.
    pub partial_match_ratio: Option<f64>,
    /// Every incorrectly predicted field.
    pub mismatches: Vec<ActionMismatch>,
    /// No event had an evaluable field.
    pub reference_incomplete: bool,
}

impl ActionLayerResult {
    /// Accuracy of one field.
    #[must_use]
    pub fn field_accuracy(&self, field: ActionField) -> Option<f64> {
        self.fields.get(&field).and_then(|f| f.accuracy)
    }

    /// Mean of the field accuracies that are strictly positive.
    ///
    /// A field with accuracy exactly 0.0 is left out, so a result whose
    /// evaluated fields are all wrong has no mean at all.
    #[must_use]
    pub fn positive_field_mean(&self) -> Option<f64> {
        mean(
            self.fields
                .values()
                .filter_map(|f| f.accuracy)
                .filter(|a| *a > 0.0),
        )
    }
}

/// Scores the action classification of events.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLayerScorer;

fn field_value(layer: Option<&ActionLayer>, field: ActionField) -> Option<&str> {
    layer.and_then(|l| l.get(field))
}

impl ActionLayerScorer {
    /// Create a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score action layers over an event alignment.
    #[must_use]
    pub fn score_alignment(&self, alignment: &EventAlignment<'_>) -> ActionLayerResult {
        let mut result = ActionLayerResult {
            fields: ActionField::ALL
                .iter()
                .map(|f| (*f, FieldAccuracy::default()))
                .collect(),
            ..ActionLayerResult::default()
        };

        for pair in &alignment.pairs {
            let Some(reference) = pair.reference else {
                result.n_events_unaligned += 1;
                continue;
            };
            let cand_layer = pair.candidate.action_layer.as_ref();
            let ref_layer = reference.action_layer.as_ref();

            match classify_field(&cand_layer, &ref_layer, "action_layer") {
                PolicyOutcome::Extra => {
                    result.n_events_skipped += 1;
                    continue;
                }
                PolicyOutcome::Matched => continue,
                PolicyOutcome::Missing | PolicyOutcome::Mismatch => {}
            }

            let mut evaluated = 0usize;
            let mut correct = 0usize;
            for field in ActionField::ALL {
                let cand_value = field_value(cand_layer, field);
                let ref_value = field_value(ref_layer, field);
                if !classify(&cand_value, &ref_value).reference_present() {
                    continue;
                }
                let ref_value = ref_value.map(str::trim).unwrap_or_default();
                let is_correct = cand_value.map(str::trim) == Some(ref_value);

                evaluated += 1;
                let tally = result.fields.entry(field).or_default();
                tally.total += 1;
                if is_correct {
                    tally.correct += 1;
                    correct += 1;
                } else {
                    result.mismatches.push(ActionMismatch {
                        event: pair.candidate.label(),
                        field,
                        candidate: cand_value.map(str::to_string),
                        reference: ref_value.to_string(),
                    });
                }
            }

            if evaluated == 0 {
                continue;
            }
            result.n_events_evaluated += 1;
            if correct == evaluated {
                result.complete_matches += 1;
            } else if correct > 0 {
                result.partial_matches += 1;
            }
        }

        for tally in result.fields.values_mut() {
            tally.accuracy = ratio(tally.correct, tally.total);
        }
        result.complete_match_ratio = ratio(result.complete_matches, result.n_events_evaluated);
        result.partial_match_ratio = ratio(result.partial_matches, result.n_events_evaluated);
        result.reference_incomplete = result.n_events_evaluated == 0;

        log::debug!(
            "action layer: evaluated={} complete={} partial={} skipped={}",
            result.n_events_evaluated,
            result.complete_matches,
            result.partial_matches,
            result.n_events_skipped
        );
        result
    }
}

impl Scorer for ActionLayerScorer {
    fn dimension(&self) -> Dimension {
        Dimension::ActionLayer
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<DimensionResult> {
        Ok(DimensionResult::ActionLayer(
            self.score_alignment(input.alignment),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::align::align_events;
    use fabula_core::NarrativeEvent;

    fn event(id: &str, layer: Option<ActionLayer>) -> NarrativeEvent {
        NarrativeEvent {
            id: Some(id.into()),
            action_layer: layer,
            ..NarrativeEvent::default()
        }
    }

    #[test]
    fn test_status_mismatch_is_partial() {
        let reference = vec![event(
            "e1",
            Some(
                ActionLayer::default()
                    .with(ActionField::Category, "Physical & Conflict")
                    .with(ActionField::Status, "success"),
            ),
        )];
        let candidate = vec![event(
            "e1",
            Some(
                ActionLayer::default()
                    .with(ActionField::Category, "Physical & Conflict")
                    .with(ActionField::Status, "failure"),
            ),
        )];
        let alignment = align_events(&candidate, &reference);
        let result = ActionLayerScorer::new().score_alignment(&alignment);

        let category = result.fields[&ActionField::Category];
        assert_eq!((category.correct, category.total), (1, 1));
        let status = result.fields[&ActionField::Status];
        assert_eq!((status.correct, status.total), (0, 1));
        for field in [ActionField::Type, ActionField::Context, ActionField::Function] {
            assert_eq!(result.fields[&field].total, 0);
            assert!(result.field_accuracy(field).is_none());
        }
        assert_eq!(result.partial_matches, 1);
        assert_eq!(result.complete_matches, 0);
        assert_eq!(result.complete_match_ratio, Some(0.0));
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].field, ActionField::Status);
    }

    #[test]
    fn test_zero_accuracy_excluded_from_positive_mean() {
        let mut result = ActionLayerResult::default();
        result.fields.insert(
            ActionField::Category,
            FieldAccuracy {
                accuracy: Some(1.0),
                correct: 1,
                total: 1,
            },
        );
        result.fields.insert(
            ActionField::Status,
            FieldAccuracy {
                accuracy: Some(0.0),
                correct: 0,
                total: 1,
            },
        );
        assert_eq!(result.positive_field_mean(), Some(1.0));
    }

    #[test]
    fn test_candidate_only_layer_is_skipped() {
        let reference = vec![event("e1", None)];
        let candidate = vec![event(
            "e1",
            Some(ActionLayer::default().with(ActionField::Type, "attack")),
        )];
        let alignment = align_events(&candidate, &reference);
        let result = ActionLayerScorer::new().score_alignment(&alignment);
        assert_eq!(result.n_events_skipped, 1);
        assert!(result.reference_incomplete);
        assert!(result.mismatches.is_empty());
    }

    #[test]
    fn test_blank_candidate_value_is_wrong() {
        let reference = vec![event(
            "e1",
            Some(ActionLayer::default().with(ActionField::Function, "climax")),
        )];
        let candidate = vec![event(
            "e1",
            Some(ActionLayer::default().with(ActionField::Function, "  ")),
        )];
        let alignment = align_events(&candidate, &reference);
        let result = ActionLayerScorer::new().score_alignment(&alignment);
        assert_eq!(result.field_accuracy(ActionField::Function), Some(0.0));
        assert_eq!(result.n_events_evaluated, 1);
        assert_eq!(result.complete_matches + result.partial_matches, 0);
        assert!(!result.reference_incomplete);
    }
}
