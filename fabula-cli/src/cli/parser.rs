//! CLI argument parsing and structure definitions

use super::commands;
use clap::{Parser, Subcommand, ValueEnum};

/// Narrative annotation evaluator
#[derive(Parser)]
#[command(name = "fabula")]
#[command(
    author,
    version,
    about = "Evaluate JSON v3 story annotations against human references",
    long_about = r#"
fabula - evaluate structured story annotations

DIMENSIONS:
  characters     names and aliases (F1), archetypes (accuracy)
  relationships  (agent, target) pairs per aligned event (F1), level labels
  sentiment      relationship sentiment labels (F1), polarity
  action_layer   category / type / context / status / function per event
  text_span      sentence-boundary similarity and span overlap

Blank reference fields are treated as "not annotated": they never penalize
the candidate, and a dimension with no reference data is reported as n/a.

EXAMPLES:
  fabula eval -c model.json -r gold.json -t story.txt
  fabula batch --candidates out/ --references gold/ --format markdown
  fabula validate gold/*.json --config fabula.toml

Set RUST_LOG=debug for per-scorer counts.
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one candidate document against a reference
    #[command(visible_alias = "e")]
    Eval(commands::EvalArgs),

    /// Evaluate every reference document in a directory
    #[command(visible_alias = "b")]
    Batch(commands::BatchArgs),

    /// Check annotation files for malformed spans and unknown labels
    #[command(visible_alias = "v")]
    Validate(commands::ValidateArgs),

    /// Show or create configuration files
    Config(commands::ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format for evaluation reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary for the terminal (default)
    #[default]
    Human,
    /// Markdown report
    Markdown,
    /// Pretty-printed JSON
    Json,
}
