//! Batch command - Evaluate a directory of documents

use clap::Parser;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fabula::eval::corpus::{evaluate_corpus, CorpusItem, DocumentFailure};
use fabula::eval::report::{render_batch_json, render_batch_markdown};
use fabula::eval::CompositeEvaluator;

use super::super::output::{color, log_info, render_batch_human, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{document_id, json_files, load_config};

/// Evaluate every reference document in a directory
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Directory of candidate annotations
    #[arg(long, value_name = "DIR")]
    pub candidates: PathBuf,

    /// Directory of reference annotations; files are paired by name
    #[arg(long, value_name = "DIR")]
    pub references: PathBuf,

    /// Directory of story texts named `<document>.txt`
    #[arg(long, value_name = "DIR")]
    pub texts: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sentence-boundary tolerance; overrides the configuration
    #[arg(long, value_name = "N")]
    pub tolerance: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Fail if any document could not be evaluated
    #[arg(long)]
    pub strict: bool,

    /// Suppress status messages
    #[arg(short, long)]
    pub quiet: bool,
}

fn load_item(
    reference: &Path,
    candidates: &Path,
    texts: Option<&Path>,
) -> Result<CorpusItem, DocumentFailure> {
    let id = document_id(reference);
    let candidate = match reference.file_name() {
        Some(name) => candidates.join(name),
        None => return Err(DocumentFailure::new(id, "reference path has no file name")),
    };
    if !candidate.is_file() {
        return Err(DocumentFailure::new(
            id,
            format!("no candidate file {}", candidate.display()),
        ));
    }
    let text = texts
        .map(|dir| dir.join(format!("{}.txt", id)))
        .filter(|p| p.is_file());
    CorpusItem::load(id, &candidate, reference, text.as_deref())
}

pub fn run(args: BatchArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref(), args.tolerance)?;
    let references = json_files(&args.references)?;
    if references.is_empty() {
        return Err(format!(
            "No reference documents (*.json) found in {}",
            args.references.display()
        ));
    }

    let reference_names: BTreeSet<_> = references.iter().filter_map(|p| p.file_name()).collect();
    for candidate in json_files(&args.candidates)? {
        if candidate
            .file_name()
            .map_or(false, |name| !reference_names.contains(name))
        {
            log::warn!("{}: no reference document, ignored", candidate.display());
        }
    }

    log_info(
        &format!("Evaluating {} document(s)...", references.len()),
        args.quiet,
    );
    let items = references
        .iter()
        .map(|reference| load_item(reference, &args.candidates, args.texts.as_deref()));
    let report = evaluate_corpus(&CompositeEvaluator::new(config), items);

    let content = match args.format {
        OutputFormat::Human => render_batch_human(&report),
        OutputFormat::Markdown => render_batch_markdown(&report),
        OutputFormat::Json => {
            let mut json = render_batch_json(&report).map_err(|e| e.to_string())?;
            json.push('\n');
            json
        }
    };
    write_output(&content, args.output.as_deref())?;

    if !report.failures.is_empty() {
        log_info(
            &format!(
                "{} {} document(s) skipped",
                color("33", "warn"),
                report.failures.len()
            ),
            args.quiet,
        );
        if args.strict {
            return Err(format!(
                "{} of {} document(s) could not be evaluated",
                report.failures.len(),
                references.len()
            ));
        }
    }
    Ok(())
}
