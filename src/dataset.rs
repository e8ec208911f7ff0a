// src/dataset.rs
//! JSON Lines dataset I/O. One row per line; blank lines are ignored.

use crate::error::{AdversaError, Result};
use crate::types::{Dataset, DatasetRow};
use std::fs;
use std::path::Path;

/// # Errors
/// `Json` with the 1-based line number of the first bad row.
pub fn parse_jsonl(content: &str) -> Result<Dataset> {
    let mut rows = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: DatasetRow = serde_json::from_str(line).map_err(|source| AdversaError::Json {
            source,
            line: idx + 1,
        })?;
        rows.push(row);
    }
    Ok(Dataset::new(rows))
}

/// # Errors
/// `Io` if the file cannot be read, `Json` for a bad row.
pub fn read_jsonl(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path).map_err(|source| AdversaError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    parse_jsonl(&content)
}

/// # Errors
/// `Json` if a row cannot be serialized.
pub fn to_jsonl(dataset: &Dataset) -> Result<String> {
    let mut out = String::new();
    for (idx, row) in dataset.rows.iter().enumerate() {
        let line = serde_json::to_string(row).map_err(|source| AdversaError::Json {
            source,
            line: idx + 1,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// # Errors
/// `Io` if the file cannot be written, `Json` for an unserializable row.
pub fn write_jsonl(path: &Path, dataset: &Dataset) -> Result<()> {
    let content = to_jsonl(dataset)?;
    fs::write(path, content).map_err(|source| AdversaError::Io {
        source,
        path: path.to_path_buf(),
    })
}
