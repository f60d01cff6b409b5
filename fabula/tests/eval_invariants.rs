//! Invariant tests for evaluation code.
//!
//! These tests pin down properties every scorer must keep regardless of
//! input: scores stay in range, blank reference data is never penalized,
//! and every reference item is consumed at most once.

use fabula::eval::character::CharacterScorer;
use fabula::eval::prelude::*;
use fabula::{ActionField, ActionLayer, Character, Document, NarrativeEvent, Relationship};

fn annotated() -> Document {
    Document::new()
        .with_text("牛郎放牛。织女织布。二人相会。")
        .with_characters(vec![
            Character::new("牛郎").with_archetype("Hero"),
            Character::new("织女").with_aliases("仙女"),
        ])
        .with_events(vec![
            NarrativeEvent::new()
                .with_id("e1")
                .with_time_order(1.0)
                .with_span(0, 5)
                .with_participants(&["牛郎"], &["牛"])
                .with_relationship(
                    Relationship::new("牛郎", "织女")
                        .with_levels("romance", "lovers")
                        .with_sentiment("positive"),
                )
                .with_action_layer(
                    ActionLayer::default()
                        .with(ActionField::Category, "Daily Life")
                        .with(ActionField::Status, "success"),
                ),
            NarrativeEvent::new()
                .with_id("e2")
                .with_time_order(2.0)
                .with_span(5, 15)
                .with_participants(&["织女"], &[]),
        ])
}

fn assert_unit_interval(value: Option<f64>, what: &str) {
    if let Some(v) = value {
        assert!(
            (0.0..=1.0).contains(&v),
            "{} should be in [0.0, 1.0], got {}",
            what,
            v
        );
    }
}

/// Test that every component and the overall score stay in [0.0, 1.0]
#[test]
fn property_scores_bounded() {
    let evaluator = CompositeEvaluator::default();
    let full = annotated();
    let empty = Document::new();
    let partial = Document::new().with_characters(vec![Character::new("王母")]);

    for (cand, refr) in [(&full, &full), (&empty, &full), (&full, &partial), (&partial, &full)] {
        let result = evaluator.evaluate(cand, refr, None);
        assert!(
            (0.0..=1.0).contains(&result.overall_score),
            "Overall score should be in [0.0, 1.0], got {}",
            result.overall_score
        );
        for (dimension, score) in &result.component_scores {
            assert_unit_interval(*score, dimension.as_str());
        }
    }
}

/// Test that a document compared with itself scores perfectly where it has data
#[test]
fn property_self_comparison_is_perfect() {
    let doc = annotated();
    let result = CompositeEvaluator::default().evaluate(&doc, &doc, None);

    for dimension in Dimension::ALL {
        assert_eq!(
            result.component(dimension),
            Some(1.0),
            "{} should be perfect on identical documents",
            dimension
        );
    }
    assert_eq!(result.overall_score, 1.0);
    assert!(result.summary.failed.is_empty());
}

/// Test that evaluating twice gives identical results
#[test]
fn property_evaluation_is_deterministic() {
    let candidate = annotated();
    let reference = Document::new().with_characters(vec![
        Character::new("牛郎"),
        Character::new("老牛"),
    ]);
    let evaluator = CompositeEvaluator::default();

    let first = evaluator.evaluate(&candidate, &reference, None);
    let second = evaluator.evaluate(&candidate, &reference, None);
    assert_eq!(first, second, "Evaluation should be deterministic");
}

/// Test that an empty reference yields "not applicable" everywhere, not zero
#[test]
fn property_blank_reference_never_penalizes() {
    let result = CompositeEvaluator::default().evaluate(&annotated(), &Document::new(), None);

    for dimension in Dimension::ALL {
        assert_eq!(
            result.component(dimension),
            None,
            "{} should be unavailable against an empty reference",
            dimension
        );
    }
    assert_eq!(result.overall_score, 0.0, "No components means overall 0.0");
    assert!(result.summary.failed.is_empty());
}

/// Test that an empty candidate against a full reference is scored, not skipped
#[test]
fn property_blank_candidate_is_penalized() {
    let reference = annotated();
    let result = CompositeEvaluator::default().evaluate(&Document::new(), &reference, None);

    assert_eq!(result.component(Dimension::Characters), Some(0.0));
    assert!(
        result.overall_score < 1.0,
        "Missing annotations must lower the score, got {}",
        result.overall_score
    );
}

/// Test that each reference character is matched at most once
#[test]
fn property_references_consumed_once() {
    let reference = vec![Character::new("牛郎")];
    let candidate = vec![
        Character::new("牛郎"),
        Character::new("阿牛"),
        Character::new("牛郎"),
    ];
    let result = CharacterScorer::new().score_characters(&candidate, &reference);

    assert_eq!(result.true_positives, 1, "Only one candidate may claim 牛郎");
    assert_eq!(result.false_positives, 2);
    assert_eq!(result.false_negatives, 0);
    assert!(
        result.true_positives + result.false_negatives <= reference.len(),
        "Matches cannot exceed reference size"
    );
}

/// Test that F1 = 2 * P * R / (P + R) when P + R > 0
#[test]
fn property_f1_formula() {
    let reference = vec![
        Character::new("牛郎"),
        Character::new("织女"),
        Character::new("老牛"),
        Character::new("王母"),
    ];
    let candidate = vec![Character::new("牛郎"), Character::new("天帝")];
    let result = CharacterScorer::new().score_characters(&candidate, &reference);

    let precision = result.precision.unwrap();
    let recall = result.recall.unwrap();
    let f1 = result.f1.unwrap();
    let expected_f1 = 2.0 * precision * recall / (precision + recall);
    assert!(
        (f1 - expected_f1).abs() < 1e-10,
        "F1 should equal 2*P*R/(P+R). Got {}, expected {}",
        f1,
        expected_f1
    );
}

/// Test that corpus means are computed over available documents only
#[test]
fn property_corpus_mean_ignores_unavailable() {
    let evaluator = CompositeEvaluator::default();
    let with_characters = annotated();
    let items = vec![
        Ok(CorpusItem::new("full", with_characters.clone(), with_characters)),
        Ok(CorpusItem::new("blank", Document::new(), Document::new())),
    ];
    let report = evaluate_corpus(&evaluator, items);

    assert_eq!(report.summary.n_documents, 2);
    let characters = report.summary.components[&Dimension::Characters];
    assert_eq!(characters.count, 1, "Blank reference must not be counted");
    assert_eq!(characters.mean, Some(1.0));
}
