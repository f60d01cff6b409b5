//! Property tests for the evaluation building blocks.

use fabula::eval::character::CharacterScorer;
use fabula::eval::matcher::match_by_key;
use fabula::eval::metrics::overlap_ratio;
use fabula::eval::policy::{classify, PolicyOutcome};
use fabula::eval::prelude::*;
use fabula::eval::segmentation::{boundary_similarity, split_sentences};
use fabula::{ActionField, ActionLayer, Character, Document, NarrativeEvent, Relationship};
use proptest::prelude::*;
use std::collections::HashSet;

fn sorted_boundaries() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::btree_set(1usize..60, 0..12).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #[test]
    fn test_overlap_bounded_and_symmetric(
        a_start in 0usize..200,
        a_len in 0usize..100,
        b_start in 0usize..200,
        b_len in 0usize..100,
    ) {
        let a_end = a_start + a_len;
        let b_end = b_start + b_len;
        let ab = overlap_ratio(a_start, a_end, b_start, b_end);
        let ba = overlap_ratio(b_start, b_end, a_start, a_end);

        prop_assert!((0.0..=1.0).contains(&ab), "Overlap should be in [0, 1], got {}", ab);
        prop_assert_eq!(ab, ba, "Overlap should be symmetric");
        prop_assert_eq!(overlap_ratio(a_start, a_end, a_start, a_end), 1.0);
    }

    #[test]
    fn test_boundary_score_bounded(
        reference in sorted_boundaries(),
        candidate in sorted_boundaries(),
        tolerance in 0usize..5,
    ) {
        let alignment = boundary_similarity(&reference, &candidate, tolerance);

        prop_assert!((0.0..=1.0).contains(&alignment.score),
            "Boundary score should be in [0, 1], got {}", alignment.score);
        prop_assert!(alignment.matched <= reference.len().min(candidate.len()),
            "Each boundary can be matched at most once");
        prop_assert!(alignment.displacement <= alignment.matched * tolerance,
            "Every matched pair lies within tolerance");
    }

    #[test]
    fn test_boundary_self_similarity(reference in sorted_boundaries(), tolerance in 0usize..5) {
        let alignment = boundary_similarity(&reference, &reference, tolerance);
        prop_assert_eq!(alignment.score, 1.0);
        prop_assert_eq!(alignment.displacement, 0);
    }

    #[test]
    fn test_boundary_tolerance_monotonic(
        reference in sorted_boundaries(),
        candidate in sorted_boundaries(),
        tolerance in 0usize..5,
    ) {
        // Widening the window can only admit more pairs.
        let narrow = boundary_similarity(&reference, &candidate, tolerance);
        let wide = boundary_similarity(&reference, &candidate, tolerance + 1);
        prop_assert!(wide.matched >= narrow.matched,
            "tolerance {} matched {}, tolerance {} matched {}",
            tolerance, narrow.matched, tolerance + 1, wide.matched);
        prop_assert!(wide.score >= narrow.score);
    }

    #[test]
    fn test_missing_policy_symmetry(
        candidate in prop::option::of("[ a-c]{0,3}"),
        reference in prop::option::of("[ a-c]{0,3}"),
    ) {
        let forward = classify(&candidate, &reference);
        let backward = classify(&reference, &candidate);
        match forward {
            PolicyOutcome::Extra => {
                prop_assert_eq!(backward, PolicyOutcome::Missing);
                prop_assert!(!forward.is_penalized(), "Blank reference must never penalize");
            }
            PolicyOutcome::Missing => {
                prop_assert_eq!(backward, PolicyOutcome::Extra);
                prop_assert!(forward.is_penalized());
            }
            other => prop_assert_eq!(backward, other),
        }
    }

    #[test]
    fn test_match_by_key_one_to_one(
        candidates in prop::collection::vec("[a-e]", 0..12),
        references in prop::collection::vec("[a-e]", 0..12),
    ) {
        let m = match_by_key(
            &candidates,
            &references,
            |c: &String| [c.clone()],
            |r: &String| [r.clone()],
        );

        let mut seen = HashSet::new();
        for (c, r) in m.matched_pairs() {
            prop_assert!(seen.insert(r), "Reference {} consumed twice", r);
            prop_assert_eq!(&candidates[c], &references[r]);
        }
        prop_assert_eq!(m.pairs.len(), candidates.len());
        prop_assert_eq!(m.matched() + m.unmatched_references.len(), references.len());
    }

    #[test]
    fn test_character_counts_partition(
        candidates in prop::collection::vec("[a-f]", 0..10),
        references in prop::collection::vec("[a-f]", 0..10),
    ) {
        let candidate: Vec<Character> = candidates.iter().map(Character::new).collect();
        let reference: Vec<Character> = references.iter().map(Character::new).collect();
        let result = CharacterScorer::new().score_characters(&candidate, &reference);

        if reference.is_empty() {
            prop_assert!(result.reference_incomplete);
            prop_assert_eq!(result.f1, None);
        } else {
            prop_assert_eq!(result.true_positives + result.false_positives, candidate.len());
            prop_assert_eq!(result.true_positives + result.false_negatives, reference.len());
            let f1 = result.f1.unwrap_or(0.0);
            prop_assert!((0.0..=1.0).contains(&f1), "F1 should be in [0, 1], got {}", f1);
        }
    }

    #[test]
    fn test_sentences_are_contiguous(text in "[a-z牛郎 ]{0,20}([。！？.!?][a-z牛郎 ]{0,20}){0,5}") {
        let sentences = split_sentences(&text);
        let n_chars = text.chars().count();

        if let Some(first) = sentences.first() {
            prop_assert_eq!(first.start, 0);
        }
        for pair in sentences.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start, "Sentences should tile the text");
        }
        for s in &sentences {
            prop_assert!(s.start < s.end, "Sentence {:?} is empty", s);
            prop_assert!(s.end <= n_chars);
        }
    }
}

// =============================================================================
// Whole-document self comparison
// =============================================================================

const STORY: &str = "牛郎放牛。织女织布。二人相会。王母划河。鹊桥重逢。";
const NAMES: [&str; 5] = ["牛郎", "织女", "老牛", "王母", "Ox"];
const PARTICIPANTS: [&str; 4] = ["牛郎", "织女", "老牛", ""];
const LEVELS: [&str; 3] = ["kin", "romance", "conflict"];
const SENTIMENTS: [&str; 4] = ["romantic", "hostile", "neutral", "jealous"];
const ACTIONS: [&str; 3] = ["Daily Life", "success", "attack"];

fn label(pool: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(pool).prop_map(String::from))
}

/// Names and aliases drawn from a small pool so that names, aliases and
/// duplicates collide often.
fn character() -> impl Strategy<Value = Character> {
    (
        prop::sample::select(&NAMES[..]),
        prop::collection::vec(prop::sample::select(&NAMES[..]), 0..3),
    )
        .prop_map(|(name, aliases)| Character::new(name).with_aliases(&aliases.join(";")))
}

/// Relationships with distinct `(agent, target)` keys, blank participants included.
fn relationships() -> impl Strategy<Value = Vec<Relationship>> {
    prop::collection::btree_map(
        (
            prop::sample::select(&PARTICIPANTS[..]),
            prop::sample::select(&PARTICIPANTS[..]),
        ),
        (label(&LEVELS), label(&LEVELS), label(&SENTIMENTS)),
        0..4,
    )
    .prop_map(|by_key| {
        by_key
            .into_iter()
            .map(|((agent, target), (level1, level2, sentiment))| {
                let mut relationship = Relationship::new(agent, target);
                relationship.relationship_level1 = level1;
                relationship.relationship_level2 = level2;
                relationship.sentiment = sentiment;
                relationship
            })
            .collect()
    })
}

fn action_layer() -> impl Strategy<Value = Option<ActionLayer>> {
    prop::option::of(prop::collection::vec(label(&ACTIONS), 5).prop_map(|values| {
        ActionField::ALL
            .iter()
            .zip(values)
            .fold(ActionLayer::default(), |layer, (field, value)| match value {
                Some(v) => layer.with(*field, v),
                None => layer,
            })
    }))
}

fn document() -> impl Strategy<Value = Document> {
    let event_body = (
        prop::option::of((0usize..24, 1usize..8)),
        relationships(),
        action_layer(),
    );
    (
        prop::collection::vec(character(), 0..6),
        prop::collection::vec(event_body, 0..6),
    )
        .prop_map(|(characters, bodies)| {
            let n_chars = STORY.chars().count();
            let events = bodies
                .into_iter()
                .enumerate()
                .map(|(i, (span, relationships, action_layer))| {
                    let mut event = NarrativeEvent::new()
                        .with_id(format!("e{}", i + 1))
                        .with_time_order((i + 1) as f64);
                    if let Some((start, len)) = span {
                        event = event.with_span(start, (start + len).min(n_chars));
                    }
                    event.relationships = relationships;
                    event.action_layer = action_layer;
                    event
                })
                .collect();
            Document::new()
                .with_text(STORY)
                .with_characters(characters)
                .with_events(events)
        })
}

proptest! {
    #[test]
    fn test_generated_document_matches_itself(doc in document()) {
        let result = CompositeEvaluator::default().evaluate(&doc, &doc, None);
        prop_assert!(result.summary.failed.is_empty(), "failures: {:?}", result.summary.failed);

        let events = &doc.narrative_events;
        let expectations = [
            (Dimension::Characters, !doc.characters.is_empty()),
            (Dimension::Relationships, events.iter().any(|e| !e.relationships.is_empty())),
            (
                Dimension::Sentiment,
                events.iter().flat_map(|e| &e.relationships).any(|r| r.sentiment.is_some()),
            ),
            (
                Dimension::ActionLayer,
                events.iter().any(|e| e.action_layer.as_ref().is_some_and(|a| !a.is_blank())),
            ),
            (Dimension::TextSpan, events.iter().any(|e| e.text_span.is_some())),
        ];

        for (dimension, has_data) in expectations {
            let detail = result.detail(dimension);
            prop_assert!(detail.is_some(), "{} produced no result", dimension);
            if has_data {
                prop_assert!(
                    detail.is_some_and(|d| !d.reference_incomplete()),
                    "{} flagged incomplete on identical documents",
                    dimension
                );
                prop_assert_eq!(
                    result.component(dimension),
                    Some(1.0),
                    "{} should be perfect on identical documents",
                    dimension
                );
            } else {
                prop_assert_eq!(result.component(dimension), None);
            }
        }
    }
}
