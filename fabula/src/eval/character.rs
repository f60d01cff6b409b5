//! Character list scoring.
//!
//! Candidate characters are matched to reference characters by name or alias
//! (case-insensitive), each reference character consumed at most once. A
//! reference character's own name always outranks another character's alias,
//! and characters sharing a key are handed out in file order. On top
//! of the match counts, archetype labels are compared for matched pairs where
//! both sides carry one.

use super::matcher::{match_with_index, KeyIndex};
use super::metrics::{prf_from_counts, ratio};
use super::policy::{classify, classify_field, PolicyOutcome};
use super::types::{Dimension, DimensionResult, Scorer, ScoringInput};
use crate::Result;
use fabula_core::Character;
use serde::{Deserialize, Serialize};

/// One matched character pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMatch {
    /// Candidate name as written.
    pub candidate: String,
    /// Reference name as written.
    pub reference: String,
}

/// Character scorer output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterResult {
    /// Matches / candidate characters. `None` when the reference is incomplete.
    pub precision: Option<f64>,
    /// Matches / reference characters.
    pub recall: Option<f64>,
    /// Harmonic mean of precision and recall.
    pub f1: Option<f64>,
    /// Matched characters.
    pub true_positives: usize,
    /// Candidate characters with no reference counterpart.
    pub false_positives: usize,
    /// Reference characters nobody matched.
    pub false_negatives: usize,
    /// Matched pairs in candidate order.
    pub matches: Vec<CharacterMatch>,
    /// Reference names nobody matched.
    pub missing_characters: Vec<String>,
    /// Candidate names with no match.
    pub extra_characters: Vec<String>,
    /// Correct archetypes / comparable archetypes.
    pub archetype_accuracy: Option<f64>,
    /// Matched pairs with equal archetypes.
    pub archetype_correct: usize,
    /// Matched pairs where both archetypes are present.
    pub archetype_total: usize,
    /// Matched pairs where only the reference has an archetype.
    pub archetype_missing: usize,
    /// The reference has no characters.
    pub reference_incomplete: bool,
}

/// Scores the top-level character list.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterScorer;

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn name_key(character: &Character) -> String {
    normalize(&character.name)
}

fn alias_keys(character: &Character) -> Vec<String> {
    character
        .aliases()
        .map(normalize)
        .filter(|k| !k.is_empty())
        .collect()
}

/// Name first, then aliases in declaration order.
fn lookup_keys(character: &Character) -> Vec<String> {
    let mut keys = vec![name_key(character)];
    keys.extend(alias_keys(character));
    keys
}

impl CharacterScorer {
    /// Create a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score candidate characters against reference characters.
    #[must_use]
    pub fn score_characters(&self, candidate: &[Character], reference: &[Character]) -> CharacterResult {
        if !classify(candidate, reference).reference_present() {
            log::debug!(
                "characters: reference has no characters, {} candidate(s) reported as extra",
                candidate.len()
            );
            return CharacterResult {
                extra_characters: candidate.iter().map(|c| c.name.clone()).collect(),
                reference_incomplete: true,
                ..CharacterResult::default()
            };
        }

        let index = KeyIndex::pooled(reference, |c| [name_key(c)], alias_keys);
        let matching = match_with_index(candidate, &index, reference.len(), lookup_keys);

        let mut result = CharacterResult::default();
        for (c_idx, r_idx) in matching.matched_pairs() {
            let (cand, refr) = (&candidate[c_idx], &reference[r_idx]);
            result.matches.push(CharacterMatch {
                candidate: cand.name.clone(),
                reference: refr.name.clone(),
            });

            match classify_field(&cand.archetype, &refr.archetype, "archetype") {
                PolicyOutcome::Mismatch => {
                    result.archetype_total += 1;
                    if archetypes_equal(cand, refr) {
                        result.archetype_correct += 1;
                    }
                }
                PolicyOutcome::Missing => result.archetype_missing += 1,
                PolicyOutcome::Extra | PolicyOutcome::Matched => {}
            }
        }

        result.extra_characters = matching
            .unmatched_candidates()
            .map(|idx| candidate[idx].name.clone())
            .collect();
        result.missing_characters = matching
            .unmatched_references
            .iter()
            .map(|&idx| reference[idx].name.clone())
            .collect();

        result.true_positives = result.matches.len();
        result.false_positives = result.extra_characters.len();
        result.false_negatives = result.missing_characters.len();

        let prf = prf_from_counts(
            result.true_positives,
            result.false_positives,
            result.false_negatives,
        );
        result.precision = Some(prf.precision);
        result.recall = Some(prf.recall);
        result.f1 = Some(prf.f1);
        result.archetype_accuracy = ratio(result.archetype_correct, result.archetype_total);

        log::debug!(
            "characters: tp={} fp={} fn={} archetype {}/{}",
            result.true_positives,
            result.false_positives,
            result.false_negatives,
            result.archetype_correct,
            result.archetype_total
        );
        result
    }
}

fn archetypes_equal(candidate: &Character, reference: &Character) -> bool {
    match (&candidate.archetype, &reference.archetype) {
        (Some(c), Some(r)) => c.trim() == r.trim(),
        _ => false,
    }
}

impl Scorer for CharacterScorer {
    fn dimension(&self) -> Dimension {
        Dimension::Characters
    }

    fn score(&self, input: &ScoringInput<'_>) -> Result<DimensionResult> {
        Ok(DimensionResult::Characters(self.score_characters(
            &input.candidate.characters,
            &input.reference.characters,
        )))
    }
}
