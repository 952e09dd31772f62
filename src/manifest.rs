//! Collection manifest: the ordered JSON list of table names a batch processes.

use crate::error::TableError;
use std::path::Path;

/// Load table names from a JSON array of strings.
///
/// A missing, blank or empty manifest means the tabular sources were never exported,
/// which is reported as a configuration error.
pub fn load_manifest(path: &Path) -> Result<Vec<String>, TableError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_generated(path)),
        Err(e) => return Err(TableError::io(path, e)),
    };
    if text.trim().is_empty() {
        return Err(not_generated(path));
    }
    let names: Vec<String> = serde_json::from_str(&text).map_err(|e| {
        TableError::Configuration(format!("manifest '{}' is not a list of names: {}", path.display(), e))
    })?;
    if names.is_empty() {
        return Err(not_generated(path));
    }
    Ok(names)
}

fn not_generated(path: &Path) -> TableError {
    TableError::Configuration(format!(
        "manifest '{}' lists no tables; generate text files first",
        path.display()
    ))
}
