//! Sentence segmentation and boundary similarity.
//!
//! Text spans are reduced to sentence boundary indices, and two boundary sets
//! are compared with a tolerance window: a candidate boundary within
//! `tolerance` sentences of a reference boundary can be credited against it.
//!
//! # Algorithm
//!
//! 1. Split the text on runs of `。！？.!?`. Each run's end (inclusive) closes a
//!    sentence; non-blank text after the last run is a final sentence.
//! 2. Map a character offset to the sentence containing it, or to the nearest
//!    sentence when it falls outside every range.
//! 3. A span ending in a later sentence than it starts, or ending exactly on a
//!    later sentence's start, yields `end_index - 1`; otherwise `end_index`.
//!    Boundary 0 carries no information and is dropped.
//! 4. Pair boundaries one-to-one within the tolerance, maximizing matches and
//!    then minimizing total displacement. Score is matches over the larger set.
//!
//! All offsets are character (Unicode scalar value) offsets, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default boundary tolerance, in sentences.
pub const DEFAULT_TOLERANCE: usize = 2;

static TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[。！？.!?]+").expect("Failed to compile sentence terminator pattern"));

/// Split `text` into contiguous sentence ranges (character offsets).
///
/// ```rust
/// use fabula::eval::segmentation::split_sentences;
///
/// assert_eq!(split_sentences("牛郎放牛。织女织布！"), vec![0..5, 5..10]);
/// assert_eq!(split_sentences("One. Two"), vec![0..4, 4..8]);
/// assert!(split_sentences("   ").is_empty());
/// ```
#[must_use]
pub fn split_sentences(text: &str) -> Vec<Range<usize>> {
    let mut sentences = Vec::new();
    let mut start_char = 0;
    let mut last_byte = 0;
    let mut last_char = 0;

    for m in TERMINATORS.find_iter(text) {
        let end_char = last_char + text[last_byte..m.end()].chars().count();
        sentences.push(start_char..end_char);
        start_char = end_char;
        last_byte = m.end();
        last_char = end_char;
    }

    let rest = &text[last_byte..];
    if !rest.trim().is_empty() {
        sentences.push(start_char..last_char + rest.chars().count());
    }
    sentences
}

/// Index of the sentence containing `offset`, or the nearest one.
///
/// `None` only when there are no sentences.
#[must_use]
pub fn sentence_index(sentences: &[Range<usize>], offset: usize) -> Option<usize> {
    if sentences.is_empty() {
        return None;
    }
    let idx = sentences.partition_point(|r| r.end <= offset);
    Some(idx.min(sentences.len() - 1))
}

/// Boundary index contributed by the span `[start, end)`, if any.
#[must_use]
pub fn span_boundary(sentences: &[Range<usize>], start: usize, end: usize) -> Option<usize> {
    let s = sentence_index(sentences, start)?;
    let e = sentence_index(sentences, end)?;
    let boundary = if e > s { e - 1 } else { e };
    (boundary > 0).then_some(boundary)
}

/// Sorted, deduplicated boundaries of a set of spans.
#[must_use]
pub fn boundaries_from_spans(sentences: &[Range<usize>], spans: &[(usize, usize)]) -> Vec<usize> {
    let mut boundaries: Vec<usize> = spans
        .iter()
        .filter_map(|&(start, end)| span_boundary(sentences, start, end))
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries
}

/// Result of comparing two boundary sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryAlignment {
    /// `matched / max(|reference|, |candidate|)`; 1.0 when both are empty.
    pub score: f64,
    /// Boundaries paired within the tolerance.
    pub matched: usize,
    /// Sum of `|reference - candidate|` over matched pairs.
    pub displacement: usize,
}

// (matches, displacement): more matches first, then less displacement.
type Cell = (usize, usize);

fn better(a: Cell, b: Cell) -> Cell {
    if a.0 > b.0 || (a.0 == b.0 && a.1 < b.1) {
        a
    } else {
        b
    }
}

/// Tolerance-windowed similarity between sorted boundary sets.
///
/// Boundaries on a line can always be paired without crossings at no loss,
/// so the assignment is an LCS-style dynamic program over both sequences.
///
/// ```rust
/// use fabula::eval::segmentation::boundary_similarity;
///
/// let exact = boundary_similarity(&[2, 5], &[2, 5], 0);
/// assert_eq!(exact.score, 1.0);
///
/// let shifted = boundary_similarity(&[2, 5], &[3, 9], 2);
/// assert_eq!(shifted.matched, 1);
/// assert_eq!(shifted.score, 0.5);
/// ```
#[must_use]
pub fn boundary_similarity(reference: &[usize], candidate: &[usize], tolerance: usize) -> BoundaryAlignment {
    let (n, m) = (reference.len(), candidate.len());
    if n == 0 && m == 0 {
        return BoundaryAlignment {
            score: 1.0,
            matched: 0,
            displacement: 0,
        };
    }

    let mut dp = vec![vec![(0usize, 0usize); m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            let mut best = better(dp[i - 1][j], dp[i][j - 1]);
            let d = reference[i - 1].abs_diff(candidate[j - 1]);
            if d <= tolerance {
                let (matched, displacement) = dp[i - 1][j - 1];
                best = better((matched + 1, displacement + d), best);
            }
            dp[i][j] = best;
        }
    }

    let (matched, displacement) = dp[n][m];
    BoundaryAlignment {
        score: matched as f64 / n.max(m) as f64,
        matched,
        displacement,
    }
}
