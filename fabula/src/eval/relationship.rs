//! Relationship scoring over aligned events.
//!
//! Within each aligned event pair, relationships are matched by their
//! case-insensitive `(agent, target)` key through the shared matcher. The same
//! per-event comparison feeds the sentiment scorer, so both dimensions agree
//! on which relationships correspond.
//!
//! # Duplicate keys
//!
//! When a reference event lists two relationships with the same key, only the
//! first is indexed. The second can never be matched and always counts as
//! missing. This is a known limitation of key-indexed matching.

use super::align::{AlignedPair, EventAlignment};
use super::matcher::match_by_key;
use super::metrics::{mean, prf_from_counts, ratio, set_prf};
use super::policy::{classify_field, PolicyOutcome};
use super::types::{Dimension, DimensionResult, Scorer, ScoringInput};
use crate::Result;
use fabula_core::{NarrativeEvent, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Shared per-event comparison
// =============================================================================

/// Relationships of one event pair after key matching.
#[derive(Debug, Clone, Default)]
pub(crate) struct RelationshipPairs<'a> {
    pub matched: Vec<(&'a Relationship, &'a Relationship)>,
    pub extra: Vec<&'a Relationship>,
    pub missing: Vec<&'a Relationship>,
}

/// How one aligned event contributes to relationship-based scoring.
#[derive(Debug, Clone)]
pub(crate) enum EventRelationships<'a> {
    /// No reference counterpart.
    Unaligned,
    /// Reference has no relationships but the candidate does.
    Skipped,
    /// Neither side has relationships.
    Empty,
    /// Reference has relationships.
    Compared(RelationshipPairs<'a>),
}

/// Match relationships by `(agent, target)`, first reference writer wins.
pub(crate) fn match_relationships<'a>(
    candidate: &'a [Relationship],
    reference: &'a [Relationship],
) -> RelationshipPairs<'a> {
    let matching = match_by_key(candidate, reference, |r| [r.key()], |r| [r.key()]);
    RelationshipPairs {
        matched: matching
            .matched_pairs()
            .map(|(c, r)| (&candidate[c], &reference[r]))
            .collect(),
        extra: matching
            .unmatched_candidates()
            .map(|c| &candidate[c])
            .collect(),
        missing: matching
            .unmatched_references
            .iter()
            .map(|&r| &reference[r])
            .collect(),
    }
}

/// Classify and, where the reference carries data, match one event pair.
pub(crate) fn compare_event<'a>(pair: &AlignedPair<'a>) -> EventRelationships<'a> {
    let Some(reference) = pair.reference else {
        return EventRelationships::Unaligned;
    };
    let candidate = pair.candidate;
    match classify_field(
        &candidate.relationships,
        &reference.relationships,
        "relationships",
    ) {
        PolicyOutcome::Extra => EventRelationships::Skipped,
        PolicyOutcome::Matched => EventRelationships::Empty,
        PolicyOutcome::Missing | PolicyOutcome::Mismatch => EventRelationships::Compared(
            match_relationships(&candidate.relationships, &reference.relationships),
        ),
    }
}

/// Event-level tallies shared by relationship and sentiment results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    /// Aligned events whose reference has relationships.
    pub n_events_evaluated: usize,
    /// Aligned events skipped because only the candidate has relationships.
    pub n_events_skipped: usize,
    /// Candidate events with no reference counterpart.
    pub n_events_unaligned: usize,
}

impl EventCounts {
    pub(crate) fn record(&mut self, event: &EventRelationships<'_>) {
        match event {
            EventRelationships::Unaligned => self.n_events_unaligned += 1,
            EventRelationships::Skipped => self.n_events_skipped += 1,
            EventRelationships::Empty => {}
            EventRelationships::Compared(_) => self.n_events_evaluated += 1,
        }
    }
}

pub(crate) fn labels_equal(candidate: &Option<String>, reference: &Option<String>) -> bool {
    match (candidate, reference) {
        (Some(c), Some(r)) => c.trim() == r.trim(),
        _ => false,
    }
}

// =============================================================================
// Relationship scorer
// =============================================================================

/// Accuracy of one relationship sub-field over matched pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelAccuracy {
    /// Correct / total, `None` when never comparable.
    pub accuracy: Option<f64>,
    /// Pairs with equal values.
    pub correct: usize,
    /// Pairs where both sides have a value.
    pub total: usize,
}

impl LevelAccuracy {
    fn record(&mut self, candidate: &Option<String>, reference: &Option<String>, field: &str) {
        if classify_field(candidate, reference, field).is_comparable() {
            self.total += 1;
            if labels_equal(candidate, reference) {
                self.correct += 1;
            }
        }
    }

    fn finish(&mut self) {
        self.accuracy = ratio(self.correct, self.total);
    }
}

/// Relationship scorer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipResult {
    /// Matches / candidate relationships in evaluated events.
    pub precision: Option<f64>,
    /// Matches / reference relationships in evaluated events.
    pub recall: Option<f64>,
    /// Harmonic mean of precision and recall.
    pub f1: Option<f64>,
    /// Relationships matched by `(agent, target)`.
    pub relationship_matches: usize,
    /// Candidate relationships in evaluated events.
    pub candidate_total: usize,
    /// Reference relationships in evaluated events.
    pub reference_total: usize,
    /// `relationship_level1` agreement.
    pub level1: LevelAccuracy,
    /// `relationship_level2` agreement.
    pub level2: LevelAccuracy,
    /// Event tallies.
    pub events: EventCounts,
    /// Unmatched candidate relationships, as `event: agent -> target`.
    pub extra_relationships: Vec<String>,
    /// Unmatched reference relationships, as `event: agent -> target`.
    pub missing_relationships: Vec<String>,
    /// Mean participant-set F1 over aligned events with reference participants.
    pub participant_f1: Option<f64>,
    /// Some event was skipped, or no event had reference relationships.
    pub reference_incomplete: bool,
}

/// Scores relationships between event participants.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipScorer;

fn participants(event: &NarrativeEvent) -> HashSet<String> {
    event
        .agents
        .iter()
        .chain(&event.targets)
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn describe(event: &NarrativeEvent, relationship: &Relationship) -> String {
    format!("{}: {}", event.label(), relationship)
}

impl RelationshipScorer {
    /// Create a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score relationships over an event alignment.
    #[must_use]
    pub fn score_alignment(&self, alignment: &EventAlignment<'_>) -> RelationshipResult {
        let mut result = RelationshipResult::default();
        let mut participant_scores = Vec::new();

        for pair in &alignment.pairs {
            if let Some(reference) = pair.reference {
                let prf = set_prf(&participants(pair.candidate), &participants(reference), true);
                participant_scores.extend(prf.map(|p| p.f1));
            }

            let event = compare_event(pair);
            result.events.record(&event);
            let EventRelationships::Compared(pairs) = event else {
                continue;
            };

            result.candidate_total += pair.candidate.relationships.len();
            if let Some(reference) = pair.reference {
                result.reference_total += reference.relationships.len();
                result
                    .missing_relationships
                    .extend(pairs.missing.iter().map(|r| describe(reference, r)));
            }
            result
                .extra_relationships
                .extend(pairs.extra.iter().map(|r| describe(pair.candidate, r)));

            for (cand, refr) in &pairs.matched {
                result.relationship_matches += 1;
                result.level1.record(
                    &cand.relationship_level1,
                    &refr.relationship_level1,
                    "relationship_level1",
                );
                result.level2.record(
                    &cand.relationship_level2,
                    &refr.relationship_level2,
                    "relationship_level2",
                );
            }
        }

        result.level1.finish();
        result.level2.finish();
        result.participant_f1 = mean(participant_scores);

        if result.events.n_events_evaluated > 0 {
            let matches = result.relationship_matches;
            let prf = prf_from_counts(
                matches,
                result.candidate_total - matches,
                result.reference_total - matches,
            );
            result.precision = Some(prf.precision);
            result.recall = Some(prf.recall);
            result.f1 = Some(prf.f1);
        }
        result.reference_incomplete =
            result.events.n_events_skipped > 0 || result.events.n_events_evaluated == 0;

        log::debug!(
            "relationships: matches={} candidate={} reference={} events evaluated={} skipped={} unaligned={}",
            result.relationship_matches,
            result.candidate_total,
            result.reference_total,
            result.events.n_events_evaluated,
            result.events.n_events_skipped,
            result.events.n_events_unaligned
        );
        result
    }
}

impl Scorer for RelationshipScorer {
    fn dimension(&self) -> Dimension {
        Dimension::Relationships
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<DimensionResult> {
        Ok(DimensionResult::Relationships(
            self.score_alignment(input.alignment),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::align::align_events;

    fn event(id: &str, relationships: Vec<Relationship>) -> NarrativeEvent {
        let mut e = NarrativeEvent::new().with_id(id);
        e.relationships = relationships;
        e
    }

    #[test]
    fn test_candidate_only_event_is_skipped() {
        let reference = vec![event("e1", vec![])];
        let candidate = vec![event("e1", vec![Relationship::new("牛郎", "织女")])];
        let alignment = align_events(&candidate, &reference);
        let result = RelationshipScorer::new().score_alignment(&alignment);

        assert_eq!(result.events.n_events_skipped, 1);
        assert_eq!(result.candidate_total, 0);
        assert_eq!(result.reference_total, 0);
        assert!(result.reference_incomplete);
        assert!(result.f1.is_none());
    }

    #[test]
    fn test_skipped_event_does_not_change_counts() {
        let reference = vec![
            event("e1", vec![Relationship::new("A", "B")]),
            event("e2", vec![]),
        ];
        let candidate = vec![
            event("e1", vec![Relationship::new("a", "b")]),
            event("e2", vec![Relationship::new("C", "D")]),
        ];
        let alignment = align_events(&candidate, &reference);
        let result = RelationshipScorer::new().score_alignment(&alignment);

        assert_eq!(result.relationship_matches, 1);
        assert_eq!(result.candidate_total, 1);
        assert_eq!(result.f1, Some(1.0));
        assert_eq!(result.events.n_events_skipped, 1);
        assert!(result.reference_incomplete);
    }

    #[test]
    fn test_duplicate_reference_key_is_unreachable() {
        let reference = vec![event(
            "e1",
            vec![
                Relationship::new("A", "B").with_levels("kin", "spouse"),
                Relationship::new("A", "B").with_levels("social", "rival"),
            ],
        )];
        let candidate = vec![event(
            "e1",
            vec![
                Relationship::new("A", "B").with_levels("kin", "spouse"),
                Relationship::new("A", "B").with_levels("social", "rival"),
            ],
        )];
        let alignment = align_events(&candidate, &reference);
        let result = RelationshipScorer::new().score_alignment(&alignment);

        assert_eq!(result.relationship_matches, 1);
        assert_eq!(result.missing_relationships, vec!["e1: A -> B"]);
        assert_eq!(result.level1.correct, 1);
        assert_eq!(result.level1.total, 1);
        assert!((result.f1.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_blank_participants_match_each_other() {
        let events = vec![event(
            "e1",
            vec![Relationship::new("", " ")
                .with_levels("kin", "spouse")
                .with_sentiment("romantic")],
        )];
        let alignment = align_events(&events, &events);
        let result = RelationshipScorer::new().score_alignment(&alignment);

        assert_eq!(result.relationship_matches, 1);
        assert_eq!(result.candidate_total, 1);
        assert_eq!(result.reference_total, 1);
        assert_eq!(result.f1, Some(1.0));
        assert!(result.extra_relationships.is_empty());
        assert!(result.missing_relationships.is_empty());
        assert!(!result.reference_incomplete);
    }

    #[test]
    fn test_levels_counted_only_when_both_present() {
        let mut partial = Relationship::new("A", "B");
        partial.relationship_level1 = Some("kin".into());
        let reference = vec![event("e1", vec![Relationship::new("A", "B").with_levels("kin", "spouse")])];
        let candidate = vec![event("e1", vec![partial])];
        let alignment = align_events(&candidate, &reference);
        let result = RelationshipScorer::new().score_alignment(&alignment);

        assert_eq!(result.level1.accuracy, Some(1.0));
        assert_eq!(result.level2.total, 0);
        assert_eq!(result.level2.accuracy, None);
    }

    #[test]
    fn test_unaligned_events_are_counted_not_scored() {
        let reference = vec![event("e1", vec![Relationship::new("A", "B")])];
        let candidate = vec![
            event("e1", vec![Relationship::new("A", "B")]),
            event("zz", vec![Relationship::new("X", "Y")]),
        ];
        let alignment = align_events(&candidate, &reference);
        let result = RelationshipScorer::new().score_alignment(&alignment);
        assert_eq!(result.events.n_events_unaligned, 1);
        assert_eq!(result.f1, Some(1.0));
        assert!(!result.reference_incomplete);
    }

    #[test]
    fn test_participant_f1() {
        let reference = vec![NarrativeEvent::new()
            .with_id("e1")
            .with_participants(&["A"], &["B"])];
        let candidate = vec![NarrativeEvent::new()
            .with_id("e1")
            .with_participants(&["a"], &["C"])];
        let alignment = align_events(&candidate, &reference);
        let result = RelationshipScorer::new().score_alignment(&alignment);
        assert!((result.participant_f1.unwrap() - 0.5).abs() < 1e-9);
        assert!(result.reference_incomplete);
    }
}
