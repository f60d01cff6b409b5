//! fabula - narrative annotation evaluation CLI
//!
//! Scores candidate story annotations (JSON v3) against human references on
//! five dimensions and combines them into one overall score.
//!
//! # Usage
//!
//! ```bash
//! # One document, terminal summary
//! fabula eval -c model.json -r gold.json -t story.txt
//!
//! # A directory of documents, Markdown report
//! fabula batch --candidates out/ --references gold/ --format markdown -o report.md
//!
//! # Check annotations against taxonomy files
//! fabula validate gold/*.json --config fabula.toml
//! ```
//!
//! Logging goes to stderr. `RUST_LOG` selects the level (default `warn`,
//! `--verbose` raises it to `debug`).

mod cli;

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::commands::{batch, config, eval, validate};
use cli::output::color;
use cli::parser::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<(), String> = match cli.command {
        Commands::Eval(args) => eval::run(args),
        Commands::Batch(args) => batch::run(args),
        Commands::Validate(args) => validate::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "fabula", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
