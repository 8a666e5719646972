//! Delimited-text export of the current results.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::record::{display_string, Record};
use crate::render::columns;

/// Name of the exported file.
pub const EXPORT_FILE_NAME: &str = "hall_search_results.csv";
const DELIMITER: char = ',';

/// Serialize results as comma-separated text.
///
/// The header is the first record's field names. Only values containing the
/// delimiter are quoted (inner quotes doubled); embedded newlines are written
/// as-is. Null and missing values are empty cells.
pub fn to_delimited_text(results: &[Record]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let headers = columns(results);
    let delimiter = DELIMITER.to_string();

    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(headers.join(&delimiter));
    for record in results {
        let row: Vec<String> = headers
            .iter()
            .map(|header| cell(record.get(header)))
            .collect();
        lines.push(row.join(&delimiter));
    }
    lines.join("\n")
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) if text.contains(DELIMITER) => {
            format!("\"{}\"", text.replace('"', "\"\""))
        }
        Some(value) => display_string(value).unwrap_or_default(),
        None => String::new(),
    }
}

/// Write serialized export text into `dir`, returning the file's path.
pub fn write_text(dir: &Path, text: &str) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export directory: {}", dir.display()))?;
    }
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "exported results");
    Ok(path)
}
