//! Document validation.
//!
//! Checks a single annotation for problems that would silently distort its
//! scores:
//! - Text spans out of order or past the end of the story text (errors)
//! - Span text that does not match the story text at those offsets
//! - Events that can never be aligned (no `id`, no `time_order`)
//! - Duplicate character names and duplicate relationship keys
//! - Labels outside a loaded vocabulary
//!
//! Everything except malformed spans is a warning. Vocabularies are optional;
//! with none loaded, label checks are skipped.

use crate::taxonomy::{Taxonomies, Vocabulary};
use crate::{Error, Result};
use fabula_core::{ActionField, Document};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No errors were found.
    pub is_valid: bool,
    /// Problems that make scores unreliable.
    pub errors: Vec<String>,
    /// Suspicious but scoreable.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// An empty, valid report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Convert to Result, returning error if validation failed.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "Validation failed: {}",
                self.errors.join("; ")
            )))
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

fn check_label(
    report: &mut ValidationReport,
    vocabulary: Option<&Vocabulary>,
    label: Option<&str>,
    what: &str,
    location: &str,
) {
    let (Some(vocabulary), Some(label)) = (vocabulary, label) else {
        return;
    };
    if !label.trim().is_empty() && !vocabulary.contains(label) {
        report.add_warning(format!(
            "{}: {} '{}' is not in the taxonomy",
            location, what, label
        ));
    }
}

/// Validate a document.
///
/// `text` overrides the document's embedded story text for span checks.
/// Without any text, span bounds and span text are not checked.
#[must_use]
pub fn validate_document(document: &Document, text: Option<&str>, taxonomies: &Taxonomies) -> ValidationReport {
    let mut report = ValidationReport::new();
    let text = text.or_else(|| document.text());
    let text_chars: Option<Vec<char>> = text.map(|t| t.chars().collect());

    // Characters
    let mut seen_names = HashSet::new();
    for (i, character) in document.characters.iter().enumerate() {
        let name = character.name.trim().to_lowercase();
        if name.is_empty() {
            report.add_warning(format!("Character {}: name is empty", i));
        } else if !seen_names.insert(name) {
            report.add_warning(format!(
                "Character {}: duplicate name '{}', duplicates are matched in file order",
                i, character.name
            ));
        }
        check_label(
            &mut report,
            taxonomies.characters.as_ref(),
            character.archetype.as_deref(),
            "archetype",
            &format!("Character '{}'", character.name),
        );
    }

    // Events
    for (i, event) in document.narrative_events.iter().enumerate() {
        let location = format!("Event {} ({})", i, event.label());

        if event.id.as_deref().map_or(true, |id| id.trim().is_empty()) && event.time_order.is_none() {
            report.add_warning(format!(
                "{}: has neither id nor time_order and can never be aligned",
                location
            ));
        }

        if let Some(span) = &event.text_span {
            match span.range() {
                None => report.add_warning(format!(
                    "{}: text_span lacks start or end and is ignored",
                    location
                )),
                Some((start, end)) if start > end => report.add_error(format!(
                    "{}: invalid span (start {} > end {})",
                    location, start, end
                )),
                Some((start, end)) => {
                    if start == end {
                        report.add_warning(format!("{}: empty span at {}", location, start));
                    }
                    if let Some(chars) = &text_chars {
                        if end > chars.len() {
                            report.add_error(format!(
                                "{}: end position {} out of bounds (text length: {} chars)",
                                location,
                                end,
                                chars.len()
                            ));
                        } else if let Some(expected) = span.text.as_deref().filter(|t| !t.trim().is_empty()) {
                            let found: String = chars[start..end].iter().collect();
                            if found != expected {
                                report.add_warning(format!(
                                    "{}: text mismatch. Expected '{}', found '{}'",
                                    location, expected, found
                                ));
                            }
                        }
                    }
                }
            }
        }

        let mut seen_keys = HashSet::new();
        for relationship in &event.relationships {
            if !seen_keys.insert(relationship.key()) {
                report.add_warning(format!(
                    "{}: duplicate relationship {}, only the first can be matched",
                    location, relationship
                ));
            }
            let relationships = taxonomies.relationships.as_ref();
            check_label(
                &mut report,
                relationships,
                relationship.relationship_level1.as_deref(),
                "relationship_level1",
                &location,
            );
            check_label(
                &mut report,
                relationships,
                relationship.relationship_level2.as_deref(),
                "relationship_level2",
                &location,
            );
            check_label(
                &mut report,
                taxonomies.sentiment.as_ref(),
                relationship.sentiment.as_deref(),
                "sentiment",
                &location,
            );
        }

        if let Some(layer) = &event.action_layer {
            for field in ActionField::ALL {
                check_label(
                    &mut report,
                    taxonomies.action.as_ref(),
                    layer.get(field),
                    field.as_str(),
                    &location,
                );
            }
        }
    }

    log::debug!(
        "validation: {} error(s), {} warning(s)",
        report.errors.len(),
        report.warnings.len()
    );
    report
}
