//! Utility functions for CLI commands

use std::fs;
use std::path::{Path, PathBuf};

use fabula::{Document, EvalConfig};

/// Format error message consistently
pub fn format_error(operation: &str, details: &str) -> String {
    format!("Failed to {}: {}", operation, details)
}

/// Load the configuration file if given, then apply command-line overrides
pub fn load_config(path: Option<&Path>, tolerance: Option<usize>) -> Result<EvalConfig, String> {
    let mut config = match path {
        Some(path) => EvalConfig::from_path(path).map_err(|e| format_error("load config", &e.to_string()))?,
        None => EvalConfig::default(),
    };
    if let Some(tolerance) = tolerance {
        config.boundary_tolerance = tolerance;
    }
    Ok(config)
}

/// Read and parse an annotation document
pub fn read_document(path: &Path) -> Result<Document, String> {
    Document::from_path(path).map_err(|e| format_error("read document", &e.to_string()))
}

/// Read a story text file
pub fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|e| format_error("read text", &format!("{}: {}", path.display(), e)))
}

/// `.json` files directly inside `dir`, sorted by file name
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir)
        .map_err(|e| format_error("read directory", &format!("{}: {}", dir.display(), e)))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    files.sort();
    Ok(files)
}

/// File stem as a document id
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
