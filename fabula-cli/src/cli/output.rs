//! Output formatting utilities for CLI commands

use is_terminal::IsTerminal;
use std::io::{self, Write};
use std::path::Path;

use fabula::eval::corpus::BatchReport;
use fabula::eval::{CompositeResult, Dimension, DimensionResult};

/// Log info message (respects quiet flag)
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&Path>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write to {}: {}", path.display(), e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Colorize text with ANSI escape codes (only if stdout is a terminal)
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Format metric value with color based on threshold
pub fn metric_colored(value: f64) -> String {
    let code = if value >= 90.0 {
        "1;32"
    } else if value >= 70.0 {
        "1;33"
    } else if value >= 50.0 {
        "33"
    } else {
        "1;31"
    };
    color(code, &format!("{:5.1}", value))
}

/// A component score as a colored percentage, or a dimmed `n/a`
pub fn score_colored(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{}%", metric_colored(s * 100.0)),
        None => color("90", "  n/a"),
    }
}

fn component_note(result: Option<&DimensionResult>) -> String {
    match result {
        Some(DimensionResult::Failed { error }) => color("31", &format!("failed: {}", error)),
        Some(r) if r.reference_incomplete() => color("90", "reference incomplete"),
        _ => String::new(),
    }
}

/// Terminal rendering of one composite result
pub fn render_human(result: &CompositeResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}%  ({} of {} components)\n",
        color("1", "Overall"),
        metric_colored(result.overall_score * 100.0),
        result.summary.available.len(),
        result.component_scores.len()
    ));
    for dimension in Dimension::ALL {
        out.push_str(&format!(
            "  {:<14} {}  {}\n",
            dimension.as_str(),
            score_colored(result.component(dimension)),
            component_note(result.detail(dimension))
        ));
    }
    let alignment = &result.alignment;
    out.push_str(&format!(
        "  events: {} by id, {} by time order, {} unmatched candidate, {} unmatched reference\n",
        alignment.by_id,
        alignment.by_time_order,
        alignment.unmatched_candidates,
        alignment.unmatched_references
    ));
    out
}

/// Terminal rendering of a batch run
pub fn render_batch_human(report: &BatchReport) -> String {
    let mut out = String::new();
    for outcome in &report.results {
        out.push_str(&format!(
            "{:<24} {}%\n",
            outcome.id,
            metric_colored(outcome.result.overall_score * 100.0)
        ));
    }
    for failure in &report.failures {
        out.push_str(&format!(
            "{:<24} {} {}\n",
            failure.id,
            color("31", "skipped:"),
            failure.error
        ));
    }

    let summary = &report.summary;
    out.push('\n');
    out.push_str(&format!(
        "{} {} document(s), overall {}\n",
        color("1", "Corpus"),
        summary.n_documents,
        summary.overall.format_percent()
    ));
    for dimension in Dimension::ALL {
        let count = summary.components.get(&dimension).map_or(0, |c| c.count);
        out.push_str(&format!(
            "  {:<14} {}  ({} document(s))\n",
            dimension.as_str(),
            score_colored(summary.component_mean(dimension)),
            count
        ));
    }
    out
}
