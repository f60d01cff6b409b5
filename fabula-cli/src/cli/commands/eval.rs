//! Eval command - Evaluate one candidate against a reference

use clap::Parser;
use std::path::PathBuf;

use fabula::eval::report::{render_json, render_markdown};
use fabula::eval::CompositeEvaluator;

use super::super::output::{color, log_info, render_human, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{load_config, read_document, read_text};

/// Evaluate one candidate document against a reference
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Candidate annotation (JSON v3)
    #[arg(short, long, value_name = "PATH")]
    pub candidate: PathBuf,

    /// Reference annotation (JSON v3)
    #[arg(short, long, value_name = "PATH")]
    pub reference: PathBuf,

    /// Raw story text; overrides text embedded in the documents
    #[arg(short, long, value_name = "PATH")]
    pub text: Option<PathBuf>,

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

    /// Fail if any scorer fails instead of reporting it
    #[arg(long)]
    pub strict: bool,

    /// Suppress status messages
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: EvalArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref(), args.tolerance)?;
    let candidate = read_document(&args.candidate)?;
    let reference = read_document(&args.reference)?;
    let text = args.text.as_deref().map(read_text).transpose()?;

    let evaluator = CompositeEvaluator::new(config);
    let result = if args.strict {
        evaluator
            .evaluate_strict(&candidate, &reference, text.as_deref())
            .map_err(|e| e.to_string())?
    } else {
        evaluator.evaluate(&candidate, &reference, text.as_deref())
    };

    for (dimension, error) in result.failures() {
        log_info(
            &format!("{} {} not scored: {}", color("33", "warn"), dimension, error),
            args.quiet,
        );
    }

    let content = match args.format {
        OutputFormat::Human => render_human(&result),
        OutputFormat::Markdown => render_markdown(&result),
        OutputFormat::Json => {
            let mut json = render_json(&result).map_err(|e| e.to_string())?;
            json.push('\n');
            json
        }
    };
    write_output(&content, args.output.as_deref())?;

    if let Some(path) = &args.output {
        log_info(
            &format!("{} Wrote report to {}", color("32", "ok:"), path.display()),
            args.quiet,
        );
    }
    Ok(())
}
