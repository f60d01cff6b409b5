//! Text-span scoring: sentence boundary similarity plus span overlap.
//!
//! Spans are compared two ways:
//!
//! - **Boundaries**: each span is reduced to a sentence boundary index (see
//!   [`super::segmentation`]) and the two boundary sets are compared within a
//!   tolerance window.
//! - **Overlap**: each reference span greedily takes the unused candidate span
//!   with the highest intersection-over-union.
//!
//! Locating sentences needs the story text. It comes from the caller, else the
//! candidate's `source_info`, else the reference's. With no reference spans the
//! result is `reference_incomplete` whether or not text exists.

use super::metrics::{mean, overlap_ratio};
use super::policy::classify_field;
use super::segmentation::{
    boundaries_from_spans, boundary_similarity, split_sentences, DEFAULT_TOLERANCE,
};
use super::types::{Dimension, DimensionResult, Scorer, ScoringInput};
use crate::{Error, Result};
use fabula_core::NarrativeEvent;
use serde::{Deserialize, Serialize};

/// Text-span scorer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSpanResult {
    /// Boundary similarity in `[0, 1]`; `None` without reference spans or sentences.
    pub boundary_score: Option<f64>,
    /// Boundaries paired within the tolerance.
    pub boundary_matches: usize,
    /// Total displacement of paired boundaries, in sentences.
    pub boundary_displacement: usize,
    /// Reference boundary indices.
    pub reference_boundaries: Vec<usize>,
    /// Candidate boundary indices.
    pub candidate_boundaries: Vec<usize>,
    /// Best overlap per reference span, in reference order.
    pub overlap_scores: Vec<f64>,
    /// Mean of `overlap_scores`.
    pub mean_overlap: Option<f64>,
    /// Reference spans with both offsets.
    pub n_reference_spans: usize,
    /// Candidate spans with both offsets.
    pub n_candidate_spans: usize,
    /// Sentences found in the text.
    pub n_sentences: usize,
    /// Tolerance used, in sentences.
    pub tolerance: usize,
    /// Why a score could not be computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The reference has no usable spans.
    pub reference_incomplete: bool,
}

/// Scores event text spans.
#[derive(Debug, Clone, Copy)]
pub struct TextSpanScorer {
    tolerance: usize,
}

impl Default for TextSpanScorer {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

fn valid_spans(events: &[NarrativeEvent]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|e| e.text_span.as_ref()?.range())
        .collect()
}

/// Greedy best-overlap assignment, one candidate per reference span.
fn overlap_scores(reference: &[(usize, usize)], candidate: &[(usize, usize)]) -> Vec<f64> {
    let mut used = vec![false; candidate.len()];
    reference
        .iter()
        .map(|&(rs, re)| {
            let best = candidate
                .iter()
                .enumerate()
                .filter(|(idx, _)| !used[*idx])
                .map(|(idx, &(cs, ce))| (idx, overlap_ratio(rs, re, cs, ce)))
                .filter(|(_, score)| *score > 0.0)
                .fold(None, |best: Option<(usize, f64)>, (idx, score)| match best {
                    Some((_, b)) if b >= score => best,
                    _ => Some((idx, score)),
                });
            match best {
                Some((idx, score)) => {
                    used[idx] = true;
                    score
                }
                None => 0.0,
            }
        })
        .collect()
}

impl TextSpanScorer {
    /// Create a scorer with the given boundary tolerance.
    #[must_use]
    pub fn new(tolerance: usize) -> Self {
        Self { tolerance }
    }

    /// Boundary tolerance in sentences.
    #[must_use]
    pub fn tolerance(&self) -> usize {
        self.tolerance
    }

    /// Score candidate event spans against reference event spans.
    ///
    /// # Errors
    ///
    /// [`Error::MissingText`] when the reference has spans but `text` is
    /// `None`.
    pub fn score_spans(
        &self,
        candidate: &[NarrativeEvent],
        reference: &[NarrativeEvent],
        text: Option<&str>,
    ) -> Result<TextSpanResult> {
        let reference_spans = valid_spans(reference);
        let candidate_spans = valid_spans(candidate);
        let mut result = TextSpanResult {
            n_reference_spans: reference_spans.len(),
            n_candidate_spans: candidate_spans.len(),
            tolerance: self.tolerance,
            ..TextSpanResult::default()
        };

        if !classify_field(&candidate_spans, &reference_spans, "text_span").reference_present() {
            log::debug!("text span: reference has no usable spans");
            result.reference_incomplete = true;
            return Ok(result);
        }

        let text = text.ok_or_else(|| {
            Error::missing_text("text span scoring needs the story text, none was supplied")
        })?;

        result.overlap_scores = overlap_scores(&reference_spans, &candidate_spans);
        result.mean_overlap = mean(result.overlap_scores.iter().copied());

        let sentences = split_sentences(text);
        result.n_sentences = sentences.len();
        if sentences.is_empty() {
            log::warn!("text span: story text has no sentences, boundary score unavailable");
            result.note = Some("story text contains no sentences".to_string());
            return Ok(result);
        }

        result.reference_boundaries = boundaries_from_spans(&sentences, &reference_spans);
        result.candidate_boundaries = boundaries_from_spans(&sentences, &candidate_spans);
        let alignment = boundary_similarity(
            &result.reference_boundaries,
            &result.candidate_boundaries,
            self.tolerance,
        );
        result.boundary_score = Some(alignment.score);
        result.boundary_matches = alignment.matched;
        result.boundary_displacement = alignment.displacement;

        log::debug!(
            "text span: sentences={} boundaries ref={:?} cand={:?} score={:.3} mean overlap={:?}",
            result.n_sentences,
            result.reference_boundaries,
            result.candidate_boundaries,
            alignment.score,
            result.mean_overlap
        );
        Ok(result)
    }
}

impl Scorer for TextSpanScorer {
    fn dimension(&self) -> Dimension {
        Dimension::TextSpan
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<DimensionResult> {
        self.score_spans(
            &input.candidate.narrative_events,
            &input.reference.narrative_events,
            input.resolved_text(),
        )
        .map(DimensionResult::TextSpan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ranges: &[(usize, usize)]) -> Vec<NarrativeEvent> {
        ranges
            .iter()
            .map(|&(s, e)| NarrativeEvent::new().with_span(s, e))
            .collect()
    }

    #[test]
    fn test_identical_single_sentence_span() {
        let text = "牛郎和织女在鹊桥相会。";
        assert_eq!(text.chars().count(), 11);
        let events = spans(&[(0, 10)]);
        let result = TextSpanScorer::default()
            .score_spans(&events, &events, Some(text))
            .unwrap();
        assert_eq!(result.boundary_score, Some(1.0));
        assert_eq!(result.mean_overlap, Some(1.0));
        assert!(!result.reference_incomplete);
    }

    #[test]
    fn test_no_reference_spans_checked_before_text() {
        let result = TextSpanScorer::default()
            .score_spans(&spans(&[(0, 4)]), &[NarrativeEvent::new()], None)
            .unwrap();
        assert!(result.reference_incomplete);
        assert!(result.boundary_score.is_none());
    }

    #[test]
    fn test_candidate_without_spans_is_penalized() {
        let text = "牛郎放牛。织女织布。";
        let candidate = vec![NarrativeEvent::new(), NarrativeEvent::new()];
        let result = TextSpanScorer::default()
            .score_spans(&candidate, &spans(&[(0, 5), (5, 10)]), Some(text))
            .unwrap();
        assert!(!result.reference_incomplete);
        assert_eq!(result.n_candidate_spans, 0);
        assert_eq!(result.overlap_scores, vec![0.0, 0.0]);
        assert_eq!(result.mean_overlap, Some(0.0));
    }

    #[test]
    fn test_missing_text_is_an_error() {
        let events = spans(&[(0, 4)]);
        let err = TextSpanScorer::default()
            .score_spans(&events, &events, None)
            .unwrap_err();
        assert!(matches!(err, Error::MissingText(_)));
    }

    #[test]
    fn test_blank_text_is_soft_failure() {
        let events = spans(&[(0, 4)]);
        let result = TextSpanScorer::default()
            .score_spans(&events, &events, Some("    "))
            .unwrap();
        assert!(result.boundary_score.is_none());
        assert!(result.note.is_some());
        assert!(!result.reference_incomplete);
    }

    #[test]
    fn test_greedy_overlap_uses_each_candidate_once() {
        let reference = [(0, 10), (0, 10)];
        let candidate = [(0, 10), (50, 60)];
        assert_eq!(overlap_scores(&reference, &candidate), vec![1.0, 0.0]);
    }

    #[test]
    fn test_shifted_boundaries_within_tolerance() {
        let text = "A. B. C. D. E. F.";
        let reference = spans(&[(0, 3), (3, 9)]);
        let candidate = spans(&[(0, 3), (3, 12)]);
        let strict = TextSpanScorer::new(0)
            .score_spans(&candidate, &reference, Some(text))
            .unwrap();
        let loose = TextSpanScorer::new(2)
            .score_spans(&candidate, &reference, Some(text))
            .unwrap();
        assert_eq!(strict.boundary_score, Some(0.0));
        assert_eq!(loose.boundary_score, Some(1.0));
        assert_eq!(loose.boundary_displacement, 1);
    }
}
