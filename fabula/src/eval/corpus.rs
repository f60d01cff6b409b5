//! Corpus-level evaluation and aggregation.
//!
//! A batch evaluates many candidate/reference pairs independently. Documents
//! that could not be loaded are logged and excluded from aggregation; they
//! never abort the batch. With the `parallel` feature, documents are
//! evaluated on the rayon thread pool.
//!
//! Aggregation averages each component over the documents where it is
//! available, independently per component, so a corpus with partial
//! references still gets a per-dimension picture.

use super::composite::{CompositeEvaluator, CompositeResult};
use super::types::{Dimension, ScoreSpread};
use fabula_core::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One candidate/reference pair to evaluate.
#[derive(Debug, Clone)]
pub struct CorpusItem {
    /// Document identifier, usually the file name.
    pub id: String,
    /// Document under evaluation.
    pub candidate: Document,
    /// Ground truth.
    pub reference: Document,
    /// Story text, overriding any embedded text.
    pub text: Option<String>,
}

impl CorpusItem {
    /// Pair two documents.
    #[must_use]
    pub fn new(id: impl Into<String>, candidate: Document, reference: Document) -> Self {
        Self {
            id: id.into(),
            candidate,
            reference,
            text: None,
        }
    }

    /// Supply the story text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Load both documents (and optional text) from files.
    pub fn load(
        id: impl Into<String>,
        candidate: &Path,
        reference: &Path,
        text: Option<&Path>,
    ) -> Result<Self, DocumentFailure> {
        let id = id.into();
        let fail = |e: &dyn fmt::Display| DocumentFailure::new(id.clone(), e);
        let candidate = Document::from_path(candidate).map_err(|e| fail(&e))?;
        let reference = Document::from_path(reference).map_err(|e| fail(&e))?;
        let text = text
            .map(std::fs::read_to_string)
            .transpose()
            .map_err(|e| fail(&e))?;
        Ok(Self {
            id,
            candidate,
            reference,
            text,
        })
    }
}

/// A successfully evaluated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Document identifier.
    pub id: String,
    /// Its composite result.
    pub result: CompositeResult,
}

/// A document that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Document identifier.
    pub id: String,
    /// What went wrong.
    pub error: String,
}

impl DocumentFailure {
    /// Record a failure.
    pub fn new(id: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            id: id.into(),
            error: error.to_string(),
        }
    }
}

/// Mean of one component over the documents where it is available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentAggregate {
    /// `None` when no document had this component.
    pub mean: Option<f64>,
    /// Documents contributing.
    pub count: usize,
}

/// Corpus-level averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Documents aggregated.
    pub n_documents: usize,
    /// Mean overall score, 0.0 for an empty corpus.
    pub mean_overall_score: f64,
    /// Spread of the overall score.
    pub overall: ScoreSpread,
    /// Per-component means.
    pub components: BTreeMap<Dimension, ComponentAggregate>,
}

impl CorpusSummary {
    /// Aggregate per-document results.
    ///
    /// ```rust
    /// use fabula::eval::corpus::CorpusSummary;
    /// use fabula::eval::composite::CompositeEvaluator;
    /// use fabula::eval::types::Dimension;
    /// use fabula::{Character, Document};
    ///
    /// let reference = Document::new().with_characters(vec![Character::new("A")]);
    /// let evaluator = CompositeEvaluator::default();
    /// let results = vec![
    ///     evaluator.evaluate(&reference, &reference, None),
    ///     evaluator.evaluate(&Document::new(), &reference, None),
    /// ];
    ///
    /// let summary = CorpusSummary::from_results(&results);
    /// assert_eq!(summary.n_documents, 2);
    /// assert_eq!(summary.components[&Dimension::Characters].mean, Some(0.5));
    /// assert_eq!(summary.components[&Dimension::Sentiment].count, 0);
    /// ```
    #[must_use]
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a CompositeResult>,
    {
        let mut overall = Vec::new();
        let mut per_component: BTreeMap<Dimension, Vec<f64>> =
            Dimension::ALL.iter().map(|d| (*d, Vec::new())).collect();

        for result in results {
            overall.push(result.overall_score);
            for (dimension, score) in &result.component_scores {
                if let Some(score) = score {
                    per_component.entry(*dimension).or_default().push(*score);
                }
            }
        }

        let spread = ScoreSpread::from_samples(&overall);
        Self {
            n_documents: overall.len(),
            mean_overall_score: spread.mean,
            overall: spread,
            components: per_component
                .into_iter()
                .map(|(d, scores)| {
                    let aggregate = ComponentAggregate {
                        mean: super::metrics::mean(scores.iter().copied()),
                        count: scores.len(),
                    };
                    (d, aggregate)
                })
                .collect(),
        }
    }

    /// Mean of one component.
    #[must_use]
    pub fn component_mean(&self, dimension: Dimension) -> Option<f64> {
        self.components.get(&dimension).and_then(|c| c.mean)
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Evaluated documents, in input order.
    pub results: Vec<DocumentOutcome>,
    /// Documents excluded from aggregation.
    pub failures: Vec<DocumentFailure>,
    /// Aggregate over `results`.
    pub summary: CorpusSummary,
}

fn evaluate_item(evaluator: &CompositeEvaluator, item: &CorpusItem) -> DocumentOutcome {
    let result = evaluator.evaluate(&item.candidate, &item.reference, item.text.as_deref());
    for (dimension, error) in result.failures() {
        log::warn!("{}: {} scorer failed: {}", item.id, dimension, error);
    }
    log::debug!("{}: overall {:.4}", item.id, result.overall_score);
    DocumentOutcome {
        id: item.id.clone(),
        result,
    }
}

#[cfg(feature = "parallel")]
fn evaluate_all(evaluator: &CompositeEvaluator, items: &[CorpusItem]) -> Vec<DocumentOutcome> {
    use rayon::prelude::*;
    items
        .par_iter()
        .map(|item| evaluate_item(evaluator, item))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all(evaluator: &CompositeEvaluator, items: &[CorpusItem]) -> Vec<DocumentOutcome> {
    items
        .iter()
        .map(|item| evaluate_item(evaluator, item))
        .collect()
}

/// Evaluate a corpus.
///
/// Items that failed to load are logged, reported in
/// [`BatchReport::failures`] and left out of the summary.
pub fn evaluate_corpus<I>(evaluator: &CompositeEvaluator, items: I) -> BatchReport
where
    I: IntoIterator<Item = Result<CorpusItem, DocumentFailure>>,
{
    let mut loaded = Vec::new();
    let mut failures = Vec::new();
    for item in items {
        match item {
            Ok(item) => loaded.push(item),
            Err(failure) => {
                log::warn!("skipping {}: {}", failure.id, failure.error);
                failures.push(failure);
            }
        }
    }

    let results = evaluate_all(evaluator, &loaded);
    let summary = CorpusSummary::from_results(results.iter().map(|o| &o.result));
    log::info!(
        "evaluated {} document(s), {} skipped, mean overall {:.4}",
        results.len(),
        failures.len(),
        summary.mean_overall_score
    );

    BatchReport {
        results,
        failures,
        summary,
    }
}
