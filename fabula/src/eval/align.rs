//! Event alignment between candidate and reference documents.
//!
//! Each candidate event is paired with at most one reference event:
//!
//! 1. by `id`, if the candidate has one and that reference event is unconsumed;
//! 2. otherwise by `time_order`, under the same single-use rule;
//! 3. otherwise it stays unaligned.
//!
//! Greedy and single-pass (see [`super::matcher`]). Reference events nobody
//! aligned with are returned separately so callers can account for recall.

use super::matcher::match_by_key;
use fabula_core::NarrativeEvent;
use serde::{Deserialize, Serialize};

/// How a pair was aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignRule {
    /// Matching `id`.
    Id,
    /// Matching `time_order`.
    TimeOrder,
}

/// One candidate event and its reference counterpart, if any.
#[derive(Debug, Clone, Copy)]
pub struct AlignedPair<'a> {
    /// Candidate event.
    pub candidate: &'a NarrativeEvent,
    /// Reference event, `None` when unaligned.
    pub reference: Option<&'a NarrativeEvent>,
    /// Rule that produced the alignment.
    pub rule: Option<AlignRule>,
}

/// Full alignment of two event lists.
#[derive(Debug, Clone)]
pub struct EventAlignment<'a> {
    /// One entry per candidate event, in candidate order.
    pub pairs: Vec<AlignedPair<'a>>,
    /// Reference events with no candidate counterpart, in reference order.
    pub unmatched_references: Vec<&'a NarrativeEvent>,
}

/// Alignment counts, for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    /// Pairs aligned by id.
    pub by_id: usize,
    /// Pairs aligned by time order.
    pub by_time_order: usize,
    /// Candidate events with no counterpart.
    pub unmatched_candidates: usize,
    /// Reference events with no counterpart.
    pub unmatched_references: usize,
}

impl<'a> EventAlignment<'a> {
    /// Pairs that have a reference counterpart.
    pub fn aligned(&self) -> impl Iterator<Item = &AlignedPair<'a>> + '_ {
        self.pairs.iter().filter(|p| p.reference.is_some())
    }

    /// Count pairs per rule.
    #[must_use]
    pub fn summary(&self) -> AlignmentSummary {
        let mut summary = AlignmentSummary {
            unmatched_references: self.unmatched_references.len(),
            ..AlignmentSummary::default()
        };
        for pair in &self.pairs {
            match pair.rule {
                Some(AlignRule::Id) => summary.by_id += 1,
                Some(AlignRule::TimeOrder) => summary.by_time_order += 1,
                None => summary.unmatched_candidates += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EventKey {
    Id(String),
    TimeOrder(u64),
}

fn time_key(time_order: f64) -> Option<u64> {
    if !time_order.is_finite() {
        return None;
    }
    // -0.0 and 0.0 must index the same slot
    let normalized = if time_order == 0.0 { 0.0 } else { time_order };
    Some(normalized.to_bits())
}

fn event_keys(event: &NarrativeEvent) -> Vec<EventKey> {
    let mut keys = Vec::with_capacity(2);
    if let Some(id) = event.id.as_deref().filter(|id| !id.trim().is_empty()) {
        keys.push(EventKey::Id(id.to_string()));
    }
    if let Some(t) = event.time_order.and_then(time_key) {
        keys.push(EventKey::TimeOrder(t));
    }
    keys
}

/// Align candidate events to reference events.
///
/// ```rust
/// use fabula::eval::align::{align_events, AlignRule};
/// use fabula_core::NarrativeEvent;
///
/// let reference = vec![
///     NarrativeEvent::new().with_id("e1").with_time_order(1.0),
///     NarrativeEvent::new().with_id("e2").with_time_order(2.0),
/// ];
/// let candidate = vec![
///     NarrativeEvent::new().with_id("x").with_time_order(2.0),
///     NarrativeEvent::new().with_id("e1"),
/// ];
///
/// let alignment = align_events(&candidate, &reference);
/// assert_eq!(alignment.pairs[0].rule, Some(AlignRule::TimeOrder));
/// assert_eq!(alignment.pairs[1].rule, Some(AlignRule::Id));
/// assert!(alignment.unmatched_references.is_empty());
/// ```
#[must_use]
pub fn align_events<'a>(
    candidates: &'a [NarrativeEvent],
    references: &'a [NarrativeEvent],
) -> EventAlignment<'a> {
    let matching = match_by_key(candidates, references, event_keys, event_keys);

    let pairs = candidates
        .iter()
        .zip(&matching.pairs)
        .map(|(candidate, m)| match m {
            Some(m) => {
                let reference = &references[m.reference];
                // Key rank is positional: the id key is only present when the
                // candidate has an id, so resolve the rule from the key itself.
                let rule = match event_keys(candidate).get(m.key_rank) {
                    Some(EventKey::Id(_)) => AlignRule::Id,
                    _ => AlignRule::TimeOrder,
                };
                AlignedPair {
                    candidate,
                    reference: Some(reference),
                    rule: Some(rule),
                }
            }
            None => AlignedPair {
                candidate,
                reference: None,
                rule: None,
            },
        })
        .collect();

    let unmatched_references = matching
        .unmatched_references
        .iter()
        .map(|&idx| &references[idx])
        .collect();

    let alignment = EventAlignment {
        pairs,
        unmatched_references,
    };
    log::debug!("event alignment: {:?}", alignment.summary());
    alignment
}
