//! Binary row encoder and artifact writing.
//!
//! Data-table records are the id field followed by every Data field in column order,
//! each converted by [`TypeTag::parse_text`](crate::schema::TypeTag::parse_text) and
//! written by [`TypeTag::encode`](crate::schema::TypeTag::encode). Dictionary rows are a
//! length-prefixed string per non-comment column. Records carry no delimiters.

use crate::codec;
use crate::data_table::DataTableProcessor;
use crate::dictionary::DictionaryProcessor;
use crate::error::TableError;
use crate::processor::TableProcessor;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A processor whose content rows can be encoded into one binary artifact.
pub trait RowEncoder {
    fn encode_rows(&self) -> Result<Vec<u8>, TableError>;
}

impl RowEncoder for DataTableProcessor {
    fn encode_rows(&self) -> Result<Vec<u8>, TableError> {
        let schema = self.schema()?;
        let mut out = Vec::new();
        for row in self.content_rows()? {
            for f in &schema.fields {
                let text = self.value(row, f.column)?;
                let conversion = |message| TableError::Conversion {
                    row,
                    column: f.column,
                    message,
                };
                let v = f.type_tag.parse_text(text).map_err(conversion)?;
                f.type_tag.encode(&v, &mut out).map_err(conversion)?;
            }
        }
        Ok(out)
    }
}

impl RowEncoder for DictionaryProcessor {
    fn encode_rows(&self) -> Result<Vec<u8>, TableError> {
        let mut columns = Vec::new();
        for column in 0..self.column_count() {
            if !self.is_comment_column(column)? {
                columns.push(column);
            }
        }
        let mut out = Vec::new();
        for row in self.content_rows()? {
            for &column in &columns {
                codec::write_string(&mut out, self.value(row, column)?);
            }
        }
        Ok(out)
    }
}

/// Replace `path` with `bytes` in one step: a temporary file in the same directory is
/// written and then renamed over the target.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TableError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TableError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| TableError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| TableError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| TableError::io(path, e.error))?;
    Ok(())
}

/// Remove a stale artifact. A missing file is not an error.
pub fn discard(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!(target: "tablegen", "removed stale {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!(target: "tablegen", "cannot remove {}: {}", path.display(), e),
    }
}

/// Encode every content row of `processor` into `path`.
///
/// On failure no artifact is left at `path`, including one from an earlier run.
/// Returns the number of bytes written.
pub fn generate_data_file<P: RowEncoder>(processor: &P, path: &Path) -> Result<usize, TableError> {
    let result = processor
        .encode_rows()
        .and_then(|bytes| write_atomic(path, &bytes).map(|()| bytes.len()));
    if result.is_err() {
        discard(path);
    }
    result
}
