//! Shared evaluation types: dimensions, the `Scorer` seam, per-dimension
//! results and score spread statistics.

use super::action::ActionLayerResult;
use super::align::EventAlignment;
use super::character::CharacterResult;
use super::relationship::RelationshipResult;
use super::sentiment::SentimentResult;
use super::text_span::TextSpanResult;
use crate::Result;
use fabula_core::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Dimensions
// =============================================================================

/// One scored aspect of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Character list and archetypes.
    Characters,
    /// Relationships between event participants.
    Relationships,
    /// Sentiment labels on relationships.
    Sentiment,
    /// Action classification of events.
    ActionLayer,
    /// Event text span boundaries.
    TextSpan,
}

impl Dimension {
    /// All dimensions in report order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Characters,
        Dimension::Relationships,
        Dimension::Sentiment,
        Dimension::ActionLayer,
        Dimension::TextSpan,
    ];

    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Characters => "characters",
            Dimension::Relationships => "relationships",
            Dimension::Sentiment => "sentiment",
            Dimension::ActionLayer => "action_layer",
            Dimension::TextSpan => "text_span",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Scorer seam
// =============================================================================

/// Everything a scorer may read. Built once per evaluation and shared by all
/// scorers; nothing in it is mutable.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    /// Document under evaluation.
    pub candidate: &'a Document,
    /// Ground truth.
    pub reference: &'a Document,
    /// Event alignment between the two.
    pub alignment: &'a EventAlignment<'a>,
    /// Explicitly supplied story text.
    pub text: Option<&'a str>,
}

impl<'a> ScoringInput<'a> {
    /// Bundle scoring inputs.
    #[must_use]
    pub fn new(
        candidate: &'a Document,
        reference: &'a Document,
        alignment: &'a EventAlignment<'a>,
        text: Option<&'a str>,
    ) -> Self {
        Self {
            candidate,
            reference,
            alignment,
            text,
        }
    }

    /// Story text: the explicit one, else the candidate's, else the reference's.
    #[must_use]
    pub fn resolved_text(&self) -> Option<&'a str> {
        self.text
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.candidate.text())
            .or_else(|| self.reference.text())
    }
}

/// A per-dimension scorer.
///
/// Scorers are pure: the same input always yields the same result, and they
/// hold no state between calls.
pub trait Scorer: Send + Sync {
    /// Dimension this scorer fills in.
    fn dimension(&self) -> Dimension;

    /// Score one candidate/reference pair.
    ///
    /// Returns an error only for unusable input (for example, text spans
    /// with no story text to locate them in). Blank reference data is a
    /// `reference_incomplete` result, not an error.
    fn score(&self, input: &ScoringInput<'_>) -> Result<DimensionResult>;
}

// =============================================================================
// Results
// =============================================================================

/// Detailed result of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DimensionResult {
    /// Character scorer output.
    Characters(CharacterResult),
    /// Relationship scorer output.
    Relationships(RelationshipResult),
    /// Sentiment scorer output.
    Sentiment(SentimentResult),
    /// Action-layer scorer output.
    ActionLayer(ActionLayerResult),
    /// Text-span scorer output.
    TextSpan(TextSpanResult),
    /// The scorer could not run.
    Failed {
        /// Error message.
        error: String,
    },
}

impl DimensionResult {
    /// Whether the reference lacked data for this dimension.
    ///
    /// A failed scorer reports `false`: the failure is not a statement about
    /// the reference.
    #[must_use]
    pub fn reference_incomplete(&self) -> bool {
        match self {
            DimensionResult::Characters(r) => r.reference_incomplete,
            DimensionResult::Relationships(r) => r.reference_incomplete,
            DimensionResult::Sentiment(r) => r.reference_incomplete,
            DimensionResult::ActionLayer(r) => r.reference_incomplete,
            DimensionResult::TextSpan(r) => r.reference_incomplete,
            DimensionResult::Failed { .. } => false,
        }
    }

    /// Error message, for failed scorers.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            DimensionResult::Failed { error } => Some(error),
            _ => None,
        }
    }
}

// =============================================================================
// Score spread
// =============================================================================

/// Mean, spread and range of a score across documents.
///
/// ```rust
/// use fabula::eval::types::ScoreSpread;
///
/// let spread = ScoreSpread::from_samples(&[0.5, 0.7, 0.9]);
/// assert!((spread.mean - 0.7).abs() < 1e-9);
/// assert_eq!(spread.n, 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSpread {
    /// Mean value
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Minimum observed value
    pub min: f64,
    /// Maximum observed value
    pub max: f64,
    /// Number of samples
    pub n: usize,
}

impl ScoreSpread {
    /// Summarize samples. Empty input gives all zeros.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Bessel's correction
        let std_dev = if n > 1 {
            let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            mean,
            std_dev,
            min,
            max,
            n,
        }
    }

    /// Format as "mean ± std (min-max)" in percent.
    #[must_use]
    pub fn format_percent(&self) -> String {
        if self.n == 0 {
            return "N/A".to_string();
        }
        format!(
            "{:.1}% ± {:.1}% ({:.1}%-{:.1}%)",
            self.mean * 100.0,
            self.std_dev * 100.0,
            self.min * 100.0,
            self.max * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_names_match_serde() {
        for d in Dimension::ALL {
            let json = serde_json::to_value(d).unwrap();
            assert_eq!(json, d.as_str());
        }
    }

    #[test]
    fn test_spread_single_sample() {
        let s = ScoreSpread::from_samples(&[0.4]);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.min, 0.4);
        assert_eq!(s.max, 0.4);
        assert_eq!(ScoreSpread::from_samples(&[]).format_percent(), "N/A");
    }

    #[test]
    fn test_failed_result_roundtrip() {
        let failed = DimensionResult::Failed {
            error: "no text".into(),
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"kind\":\"failed\""));
        let back: DimensionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error(), Some("no text"));
        assert!(!back.reference_incomplete());
    }
}
