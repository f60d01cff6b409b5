//! Report rendering.
//!
//! Pure formatting over [`CompositeResult`], [`CorpusSummary`] and
//! [`BatchReport`]: Markdown for people, pretty JSON for tools. No scoring
//! happens here.

use super::action::ActionLayerResult;
use super::character::CharacterResult;
use super::composite::CompositeResult;
use super::corpus::{BatchReport, CorpusSummary};
use super::relationship::RelationshipResult;
use super::sentiment::SentimentResult;
use super::text_span::TextSpanResult;
use super::types::{Dimension, DimensionResult};
use crate::Result;
use fabula_core::ActionField;
use std::fmt;

// =============================================================================
// Helpers
// =============================================================================

fn percent(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.1}%", s * 100.0),
        None => "n/a".to_string(),
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn status_note(result: &DimensionResult) -> String {
    match result {
        DimensionResult::Failed { error } => format!("failed: {}", error),
        r if r.reference_incomplete() => "reference incomplete".to_string(),
        DimensionResult::TextSpan(TextSpanResult { note: Some(n), .. }) => n.clone(),
        _ => String::new(),
    }
}

// =============================================================================
// Single document
// =============================================================================

/// Render a composite result as Markdown.
#[must_use]
pub fn render_markdown(result: &CompositeResult) -> String {
    let mut out = String::new();

    out.push_str("# Evaluation Report\n\n");
    out.push_str(&format!(
        "**Overall score:** {:.1}% ({} of {} components available)\n\n",
        result.overall_score * 100.0,
        result.summary.available.len(),
        result.component_scores.len()
    ));

    out.push_str("| Component | Score | Notes |\n");
    out.push_str("|-----------|-------|-------|\n");
    for (dimension, score) in &result.component_scores {
        let note = result
            .detail(*dimension)
            .map(status_note)
            .unwrap_or_default();
        out.push_str(&format!("| {} | {} | {} |\n", dimension, percent(*score), note));
    }
    out.push('\n');

    let a = &result.alignment;
    out.push_str("## Event Alignment\n\n");
    out.push_str(&format!(
        "- by id: {}, by time order: {}\n- unmatched candidate events: {}\n- unmatched reference events: {}\n\n",
        a.by_id, a.by_time_order, a.unmatched_candidates, a.unmatched_references
    ));

    for detail in result.detailed_results.values() {
        match detail {
            DimensionResult::Characters(r) => characters_section(&mut out, r),
            DimensionResult::Relationships(r) => relationships_section(&mut out, r),
            DimensionResult::Sentiment(r) => sentiment_section(&mut out, r),
            DimensionResult::ActionLayer(r) => action_section(&mut out, r),
            DimensionResult::TextSpan(r) => text_span_section(&mut out, r),
            DimensionResult::Failed { .. } => {}
        }
    }

    out
}

fn characters_section(out: &mut String, r: &CharacterResult) {
    out.push_str("## Characters\n\n");
    out.push_str(&format!(
        "- P={} R={} F1={} ({} matched, {} extra, {} missing)\n",
        percent(r.precision),
        percent(r.recall),
        percent(r.f1),
        r.true_positives,
        r.extra_characters.len(),
        r.missing_characters.len()
    ));
    out.push_str(&format!("- Missing: {}\n", list_or_none(&r.missing_characters)));
    out.push_str(&format!("- Extra: {}\n", list_or_none(&r.extra_characters)));
    out.push_str(&format!(
        "- Archetype accuracy: {} ({}/{}, {} not predicted)\n\n",
        percent(r.archetype_accuracy),
        r.archetype_correct,
        r.archetype_total,
        r.archetype_missing
    ));
}

fn relationships_section(out: &mut String, r: &RelationshipResult) {
    out.push_str("## Relationships\n\n");
    out.push_str(&format!(
        "- P={} R={} F1={} ({} matched of {} candidate / {} reference)\n",
        percent(r.precision),
        percent(r.recall),
        percent(r.f1),
        r.relationship_matches,
        r.candidate_total,
        r.reference_total
    ));
    out.push_str(&format!(
        "- Level 1 accuracy: {} ({}/{}), level 2 accuracy: {} ({}/{})\n",
        percent(r.level1.accuracy),
        r.level1.correct,
        r.level1.total,
        percent(r.level2.accuracy),
        r.level2.correct,
        r.level2.total
    ));
    out.push_str(&format!(
        "- Events: {} evaluated, {} skipped, {} unaligned\n",
        r.events.n_events_evaluated, r.events.n_events_skipped, r.events.n_events_unaligned
    ));
    out.push_str(&format!("- Participant F1: {}\n", percent(r.participant_f1)));
    out.push_str(&format!("- Missing: {}\n", list_or_none(&r.missing_relationships)));
    out.push_str(&format!("- Extra: {}\n\n", list_or_none(&r.extra_relationships)));
}

fn sentiment_section(out: &mut String, r: &SentimentResult) {
    out.push_str("## Sentiment\n\n");
    out.push_str(&format!(
        "- P={} R={} F1={} (tp {}, fp {}, fn {}, {} unscored extra labels)\n",
        percent(r.precision),
        percent(r.recall),
        percent(r.f1),
        r.true_positives,
        r.false_positives,
        r.false_negatives,
        r.extra_labels
    ));
    out.push_str(&format!(
        "- Polarity accuracy: {} ({}/{})\n",
        percent(r.polarity_accuracy),
        r.polarity_correct,
        r.polarity_total
    ));
    for m in &r.mismatches {
        out.push_str(&format!(
            "  - {}: predicted `{}`, expected `{}`\n",
            m.relationship, m.candidate, m.reference
        ));
    }
    out.push('\n');
}

fn action_section(out: &mut String, r: &ActionLayerResult) {
    out.push_str("## Action Layer\n\n");
    out.push_str(&format!(
        "- Complete matches: {} ({}/{}), partial matches: {} ({}/{})\n",
        percent(r.complete_match_ratio),
        r.complete_matches,
        r.n_events_evaluated,
        percent(r.partial_match_ratio),
        r.partial_matches,
        r.n_events_evaluated
    ));
    out.push_str(&format!(
        "- Events skipped (reference blank): {}\n\n",
        r.n_events_skipped
    ));
    out.push_str("| Field | Accuracy | Correct | Total |\n");
    out.push_str("|-------|----------|---------|-------|\n");
    for field in ActionField::ALL {
        let acc = r.fields.get(&field).copied().unwrap_or_default();
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            field,
            percent(acc.accuracy),
            acc.correct,
            acc.total
        ));
    }
    out.push('\n');
}

fn text_span_section(out: &mut String, r: &TextSpanResult) {
    out.push_str("## Text Spans\n\n");
    out.push_str(&format!(
        "- Boundary score: {} (tolerance {}, {} matched, displacement {})\n",
        percent(r.boundary_score),
        r.tolerance,
        r.boundary_matches,
        r.boundary_displacement
    ));
    out.push_str(&format!("- Mean overlap: {}\n", percent(r.mean_overlap)));
    out.push_str(&format!(
        "- Spans: {} reference, {} candidate over {} sentences\n",
        r.n_reference_spans, r.n_candidate_spans, r.n_sentences
    ));
    if let Some(note) = &r.note {
        out.push_str(&format!("- Note: {}\n", note));
    }
    out.push('\n');
}

/// Render a composite result as pretty JSON.
pub fn render_json(result: &CompositeResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

impl fmt::Display for CompositeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "overall: {:.1}%", self.overall_score * 100.0)?;
        for (dimension, score) in &self.component_scores {
            let note = self.detail(*dimension).map(status_note).unwrap_or_default();
            if note.is_empty() {
                writeln!(f, "  {:<14} {}", dimension, percent(*score))?;
            } else {
                writeln!(f, "  {:<14} {} ({})", dimension, percent(*score), note)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Corpus
// =============================================================================

/// Render corpus averages as Markdown.
#[must_use]
pub fn render_corpus_markdown(summary: &CorpusSummary) -> String {
    let mut out = String::new();
    out.push_str("# Corpus Summary\n\n");
    out.push_str(&format!("- Documents: {}\n", summary.n_documents));
    out.push_str(&format!(
        "- Overall score: {}\n\n",
        summary.overall.format_percent()
    ));

    out.push_str("| Component | Mean | Documents |\n");
    out.push_str("|-----------|------|-----------|\n");
    for dimension in Dimension::ALL {
        let agg = summary.components.get(&dimension).copied().unwrap_or_default();
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            dimension,
            percent(agg.mean),
            agg.count
        ));
    }
    out
}

/// Render a batch run as Markdown: per-document scores, summary, failures.
#[must_use]
pub fn render_batch_markdown(report: &BatchReport) -> String {
    let mut out = String::new();
    out.push_str("# Batch Evaluation\n\n");

    out.push_str("| Document | Overall |");
    for dimension in Dimension::ALL {
        out.push_str(&format!(" {} |", dimension));
    }
    out.push_str("\n|----------|---------|");
    for _ in Dimension::ALL {
        out.push_str("---|");
    }
    out.push('\n');
    for outcome in &report.results {
        out.push_str(&format!(
            "| {} | {:.1}% |",
            outcome.id,
            outcome.result.overall_score * 100.0
        ));
        for dimension in Dimension::ALL {
            out.push_str(&format!(" {} |", percent(outcome.result.component(dimension))));
        }
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&render_corpus_markdown(&report.summary));

    if !report.failures.is_empty() {
        out.push_str("\n## Skipped Documents\n\n");
        for failure in &report.failures {
            out.push_str(&format!("- {}: {}\n", failure.id, failure.error));
        }
    }
    out
}

/// Render a batch run as pretty JSON.
pub fn render_batch_json(report: &BatchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::composite::CompositeEvaluator;
    use crate::eval::corpus::{evaluate_corpus, CorpusItem, DocumentFailure};
    use fabula_core::{Character, Document};

    fn sample() -> CompositeResult {
        let reference = Document::new().with_characters(vec![
            Character::new("牛郎"),
            Character::new("织女"),
            Character::new("老牛"),
        ]);
        let candidate = Document::new().with_characters(vec![Character::new("牛郎"), Character::new("织女")]);
        CompositeEvaluator::default().evaluate(&candidate, &reference, None)
    }

    #[test]
    fn test_markdown_lists_components() {
        let md = render_markdown(&sample());
        assert!(md.contains("# Evaluation Report"));
        assert!(md.contains("| characters | 80.0% |"));
        assert!(md.contains("| sentiment | n/a | reference incomplete |"));
        assert!(md.contains("- Missing: 老牛"));
    }

    #[test]
    fn test_json_is_parseable() {
        let result = sample();
        let json = render_json(&result).unwrap();
        let back: CompositeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.overall_score, result.overall_score);
        assert_eq!(back.component(Dimension::Characters), result.component(Dimension::Characters));
    }

    #[test]
    fn test_display_one_line_per_component() {
        let text = sample().to_string();
        assert_eq!(text.lines().count(), 1 + Dimension::ALL.len());
        assert!(text.starts_with("overall: 80.0%"));
    }

    #[test]
    fn test_batch_markdown_reports_failures() {
        let doc = Document::new().with_characters(vec![Character::new("A")]);
        let report = evaluate_corpus(
            &CompositeEvaluator::default(),
            vec![
                Ok(CorpusItem::new("one.json", doc.clone(), doc)),
                Err(DocumentFailure::new("two.json", "Parse error: bad")),
            ],
        );
        let md = render_batch_markdown(&report);
        assert!(md.contains("| one.json | 100.0% |"));
        assert!(md.contains("## Skipped Documents"));
        assert!(md.contains("- two.json: Parse error: bad"));
        assert!(md.contains("- Documents: 1"));
    }
}
