//! Validate command - Validate annotation files

use clap::Parser;
use std::path::PathBuf;

use fabula::eval::validation::validate_document;
use fabula::Document;

use super::super::output::color;
use super::super::utils::{load_config, read_text};

/// Check annotation files for malformed spans and unknown labels
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// JSON v3 files to validate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Story text to check spans against; overrides embedded text
    #[arg(short, long, value_name = "PATH")]
    pub text: Option<PathBuf>,

    /// Configuration file naming taxonomy files
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref(), None)?;
    let taxonomies = config
        .load_taxonomies()
        .map_err(|e| format!("Failed to load taxonomies: {}", e))?;
    let text = args.text.as_deref().map(read_text).transpose()?;

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &args.files {
        let doc = match Document::from_path(file) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("{} {}: {}", color("31", "error"), file.display(), e);
                total_errors += 1;
                continue;
            }
        };

        let report = validate_document(&doc, text.as_deref(), &taxonomies);
        for error in &report.errors {
            eprintln!("{} {}: {}", color("31", "error"), file.display(), error);
        }
        for warning in &report.warnings {
            eprintln!("{} {}: {}", color("33", "warn"), file.display(), warning);
        }
        total_errors += report.errors.len();
        total_warnings += report.warnings.len();
    }

    println!("Validated {} file(s)", args.files.len());
    if total_errors > 0 {
        println!("{} {} errors", color("31", "x"), total_errors);
    }
    if total_warnings > 0 {
        println!("{} {} warnings", color("33", "!"), total_warnings);
    }
    if total_errors == 0 && total_warnings == 0 {
        println!("{} All valid", color("32", "ok:"));
    }

    if total_errors > 0 {
        return Err(format!("{} validation errors", total_errors));
    }
    if args.strict && total_warnings > 0 {
        return Err(format!("{} validation warnings (--strict)", total_warnings));
    }
    Ok(())
}
