//! Sentiment scoring on matched relationships.
//!
//! Relationships are paired exactly as in [`super::relationship`]; this module
//! only looks at the `sentiment` label of each matched pair.
//!
//! | candidate | reference | counted as                         |
//! |-----------|-----------|------------------------------------|
//! | label     | (none)    | extra, never penalized             |
//! | (none)    | label     | false negative                     |
//! | label     | same      | true positive                      |
//! | label     | other     | false positive and false negative  |
//!
//! Labels also map to a coarse [`Polarity`]; polarity accuracy counts only
//! pairs where both labels have one.

use super::align::EventAlignment;
use super::metrics::{prf_from_counts, ratio};
use super::policy::{classify_field, PolicyOutcome};
use super::relationship::{compare_event, labels_equal, EventCounts, EventRelationships};
use super::types::{Dimension, DimensionResult, Scorer, ScoringInput};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse sentiment direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// romantic, positive
    Positive,
    /// neutral
    Neutral,
    /// negative, fearful, hostile
    Negative,
}

impl Polarity {
    /// Map a sentiment label to its polarity, case-insensitively.
    ///
    /// ```rust
    /// use fabula::eval::sentiment::Polarity;
    ///
    /// assert_eq!(Polarity::from_label("Romantic"), Some(Polarity::Positive));
    /// assert_eq!(Polarity::from_label("hostile"), Some(Polarity::Negative));
    /// assert_eq!(Polarity::from_label("curious"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "romantic" | "positive" => Some(Polarity::Positive),
            "neutral" => Some(Polarity::Neutral),
            "negative" | "fearful" | "hostile" => Some(Polarity::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Polarity::Positive => "positive",
            Polarity::Neutral => "neutral",
            Polarity::Negative => "negative",
        })
    }
}

/// A compared pair whose labels disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentMismatch {
    /// `event: agent -> target`.
    pub relationship: String,
    /// Candidate label.
    pub candidate: String,
    /// Reference label.
    pub reference: String,
}

/// Sentiment scorer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Label precision, `None` without comparable pairs.
    pub precision: Option<f64>,
    /// Label recall.
    pub recall: Option<f64>,
    /// Label F1.
    pub f1: Option<f64>,
    /// Equal labels.
    pub true_positives: usize,
    /// Unequal candidate labels.
    pub false_positives: usize,
    /// Reference labels not reproduced.
    pub false_negatives: usize,
    /// Candidate labels the reference left blank.
    pub extra_labels: usize,
    /// Correct polarity / pairs where both sides have a polarity.
    pub polarity_accuracy: Option<f64>,
    /// Pairs with equal polarity.
    pub polarity_correct: usize,
    /// Pairs where both sides have a polarity.
    pub polarity_total: usize,
    /// Event tallies.
    pub events: EventCounts,
    /// Compared pairs with different labels.
    pub mismatches: Vec<SentimentMismatch>,
    /// Some event was skipped, or no matched pair had a reference label.
    pub reference_incomplete: bool,
}

/// Scores sentiment labels on relationships.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    /// Create a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score sentiment over an event alignment.
    #[must_use]
    pub fn score_alignment(&self, alignment: &EventAlignment<'_>) -> SentimentResult {
        let mut result = SentimentResult::default();

        for pair in &alignment.pairs {
            let event = compare_event(pair);
            result.events.record(&event);
            let EventRelationships::Compared(pairs) = event else {
                continue;
            };

            for (cand, refr) in pairs.matched {
                match classify_field(&cand.sentiment, &refr.sentiment, "sentiment") {
                    PolicyOutcome::Matched => {}
                    PolicyOutcome::Extra => result.extra_labels += 1,
                    PolicyOutcome::Missing => result.false_negatives += 1,
                    PolicyOutcome::Mismatch => {
                        if labels_equal(&cand.sentiment, &refr.sentiment) {
                            result.true_positives += 1;
                        } else {
                            result.false_positives += 1;
                            result.false_negatives += 1;
                            result.mismatches.push(SentimentMismatch {
                                relationship: format!("{}: {}", pair.candidate.label(), cand),
                                candidate: cand.sentiment.clone().unwrap_or_default(),
                                reference: refr.sentiment.clone().unwrap_or_default(),
                            });
                        }

                        let polarities = (
                            cand.sentiment.as_deref().and_then(Polarity::from_label),
                            refr.sentiment.as_deref().and_then(Polarity::from_label),
                        );
                        if let (Some(c), Some(r)) = polarities {
                            result.polarity_total += 1;
                            if c == r {
                                result.polarity_correct += 1;
                            }
                        }
                    }
                }
            }
        }

        let compared = result.true_positives + result.false_negatives;
        if compared > 0 {
            let prf = prf_from_counts(
                result.true_positives,
                result.false_positives,
                result.false_negatives,
            );
            result.precision = Some(prf.precision);
            result.recall = Some(prf.recall);
            result.f1 = Some(prf.f1);
        }
        result.polarity_accuracy = ratio(result.polarity_correct, result.polarity_total);
        result.reference_incomplete = result.events.n_events_skipped > 0 || compared == 0;

        log::debug!(
            "sentiment: tp={} fp={} fn={} extra={} polarity {}/{}",
            result.true_positives,
            result.false_positives,
            result.false_negatives,
            result.extra_labels,
            result.polarity_correct,
            result.polarity_total
        );
        result
    }
}

impl Scorer for SentimentScorer {
    fn dimension(&self) -> Dimension {
        Dimension::Sentiment
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<DimensionResult> {
        Ok(DimensionResult::Sentiment(self.score_alignment(input.alignment)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::align::align_events;
    use fabula_core::{NarrativeEvent, Relationship};

    fn rel(agent: &str, target: &str, sentiment: Option<&str>) -> Relationship {
        let r = Relationship::new(agent, target);
        match sentiment {
            Some(s) => r.with_sentiment(s),
            None => r,
        }
    }

    fn one_event(relationships: Vec<Relationship>) -> Vec<NarrativeEvent> {
        let mut e = NarrativeEvent::new().with_id("e1");
        e.relationships = relationships;
        vec![e]
    }

    #[test]
    fn test_label_outcomes() {
        let reference = one_event(vec![
            rel("A", "B", Some("romantic")),
            rel("B", "C", Some("hostile")),
            rel("C", "D", Some("neutral")),
            rel("D", "E", None),
        ]);
        let candidate = one_event(vec![
            rel("A", "B", Some("romantic")),
            rel("B", "C", Some("fearful")),
            rel("C", "D", None),
            rel("D", "E", Some("positive")),
        ]);
        let alignment = align_events(&candidate, &reference);
        let result = SentimentScorer::new().score_alignment(&alignment);

        assert_eq!(result.true_positives, 1);
        assert_eq!(result.false_positives, 1);
        assert_eq!(result.false_negatives, 2);
        assert_eq!(result.extra_labels, 1);
        assert_eq!(result.polarity_total, 2);
        assert_eq!(result.polarity_correct, 2);
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].candidate, "fearful");
        assert!(!result.reference_incomplete);
    }

    #[test]
    fn test_unknown_labels_excluded_from_polarity() {
        let reference = one_event(vec![rel("A", "B", Some("curious"))]);
        let candidate = one_event(vec![rel("A", "B", Some("positive"))]);
        let alignment = align_events(&candidate, &reference);
        let result = SentimentScorer::new().score_alignment(&alignment);
        assert_eq!(result.polarity_total, 0);
        assert!(result.polarity_accuracy.is_none());
        assert_eq!(result.f1, Some(0.0));
    }

    #[test]
    fn test_only_extra_labels_is_incomplete() {
        let reference = one_event(vec![rel("A", "B", None)]);
        let candidate = one_event(vec![rel("A", "B", Some("positive"))]);
        let alignment = align_events(&candidate, &reference);
        let result = SentimentScorer::new().score_alignment(&alignment);
        assert!(result.reference_incomplete);
        assert!(result.f1.is_none());
        assert_eq!(result.false_positives, 0);
        assert_eq!(result.extra_labels, 1);
    }
}
