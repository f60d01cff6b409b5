//! Metric primitives shared by every scorer.
//!
//! - Precision/Recall/F1 from raw counts
//! - Set Precision/Recall/F1, with a mode for incomplete references
//! - Interval overlap (intersection over union)
//! - Accuracy and mean helpers that return `None` instead of dividing by zero

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// Precision, recall and F1 for one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Prf {
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// F1 score
    pub f1: f64,
}

impl Prf {
    /// Create from precision and recall; F1 is their harmonic mean.
    #[must_use]
    pub fn new(precision: f64, recall: f64) -> Self {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }

    /// Perfect agreement.
    #[must_use]
    pub fn perfect() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Precision/recall/F1 from true positive, false positive and false negative counts.
///
/// A zero denominator yields 0.0 for that rate.
#[must_use]
pub fn prf_from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Prf {
    let precision = ratio(true_positives, true_positives + false_positives).unwrap_or(0.0);
    let recall = ratio(true_positives, true_positives + false_negatives).unwrap_or(0.0);
    Prf::new(precision, recall)
}

/// Counts for comparing a predicted set with a reference set.
#[must_use]
pub fn set_counts<T: Eq + Hash>(predicted: &HashSet<T>, reference: &HashSet<T>) -> (usize, usize, usize) {
    let tp = predicted.intersection(reference).count();
    (tp, predicted.len() - tp, reference.len() - tp)
}

/// Set precision/recall/F1.
///
/// With `reference_incomplete` set, an empty reference means "not annotated"
/// and the result is `None`. Without it, an empty reference is ground truth:
/// two empty sets agree perfectly and any prediction is a false positive.
///
/// ```rust
/// use fabula::eval::metrics::set_prf;
/// use std::collections::HashSet;
///
/// let pred: HashSet<&str> = ["a", "b"].into_iter().collect();
/// let empty = HashSet::new();
/// assert!(set_prf(&pred, &empty, true).is_none());
/// assert_eq!(set_prf(&pred, &empty, false).unwrap().precision, 0.0);
/// ```
#[must_use]
pub fn set_prf<T: Eq + Hash>(
    predicted: &HashSet<T>,
    reference: &HashSet<T>,
    reference_incomplete: bool,
) -> Option<Prf> {
    if reference.is_empty() {
        if reference_incomplete {
            return None;
        }
        if predicted.is_empty() {
            return Some(Prf::perfect());
        }
    }
    let (tp, fp, fn_) = set_counts(predicted, reference);
    Some(prf_from_counts(tp, fp, fn_))
}

/// Overlap between two `[start, end)` intervals as intersection over union.
///
/// Returns a value in `[0.0, 1.0]`: 1.0 for identical intervals (including two
/// identical empty ones), 0.0 for disjoint ones. An interval with `end < start`
/// is treated as empty at `start`.
#[must_use]
pub fn overlap_ratio(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> f64 {
    let a_end = a_end.max(a_start);
    let b_end = b_end.max(b_start);

    if a_start == b_start && a_end == b_end {
        return 1.0;
    }

    let intersection_start = a_start.max(b_start);
    let intersection_end = a_end.min(b_end);
    if intersection_start >= intersection_end {
        return 0.0;
    }

    let intersection = (intersection_end - intersection_start) as f64;
    let union = ((a_end - a_start) + (b_end - b_start)) as f64 - intersection;
    intersection / union
}

/// `numerator / denominator`, or `None` when the denominator is zero.
#[must_use]
pub fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Arithmetic mean, or `None` for an empty input.
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prf_from_counts() {
        let prf = prf_from_counts(2, 0, 1);
        assert!((prf.precision - 1.0).abs() < 1e-9);
        assert!((prf.recall - 2.0 / 3.0).abs() < 1e-9);
        assert!((prf.f1 - 0.8).abs() < 1e-9);

        let zero = prf_from_counts(0, 0, 0);
        assert_eq!(zero, Prf::default());
    }

    #[test]
    fn test_overlap_ratio() {
        // Exact match
        assert!((overlap_ratio(0, 10, 0, 10) - 1.0).abs() < 0.001);
        assert!((overlap_ratio(4, 4, 4, 4) - 1.0).abs() < 0.001);

        // Partial overlap: [5,10) over [0,15)
        assert!((overlap_ratio(0, 10, 5, 15) - 5.0 / 15.0).abs() < 0.001);

        // Touching and disjoint
        assert_eq!(overlap_ratio(0, 10, 10, 20), 0.0);
        assert_eq!(overlap_ratio(0, 10, 20, 30), 0.0);

        // Inverted interval is empty
        assert_eq!(overlap_ratio(10, 0, 0, 10), 0.0);
    }

    #[test]
    fn test_set_prf_modes() {
        let a: HashSet<&str> = ["x", "y"].into_iter().collect();
        let b: HashSet<&str> = ["y", "z"].into_iter().collect();
        let prf = set_prf(&a, &b, true).unwrap();
        assert!((prf.f1 - 0.5).abs() < 1e-9);

        let empty: HashSet<&str> = HashSet::new();
        assert_eq!(set_prf(&empty, &empty, false), Some(Prf::perfect()));
        assert_eq!(set_prf(&empty, &empty, true), None);
    }

    #[test]
    fn test_ratio_and_mean() {
        assert_eq!(ratio(1, 0), None);
        assert_eq!(ratio(1, 4), Some(0.25));
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([0.5, 1.0]), Some(0.75));
    }
}
