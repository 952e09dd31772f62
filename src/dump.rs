//! Decode binary artifacts back into rows for inspection.

use crate::codec::DataRowReader;
use crate::data_table::DataTableProcessor;
use crate::dictionary::DictionaryProcessor;
use crate::error::TableError;
use crate::processor::TableProcessor;
use crate::runtime::{read_rows, DataRowError};
use crate::schema::TableSchema;
use crate::value::Value;
use std::path::Path;

/// Decode every record of a data-table artifact.
pub fn decode_data_rows(schema: &TableSchema, bytes: &[u8]) -> Result<Vec<Vec<Value>>, DataRowError> {
    let mut record = 0usize;
    read_rows(bytes, |reader| {
        let start = reader.position();
        let row = schema.decode_row(reader).map_err(|e| match e {
            DataRowError::Malformed(m) => {
                DataRowError::Malformed(format!("record {} at byte {}: {}", record, start, m))
            }
            other => other,
        })?;
        record += 1;
        Ok(row)
    })
}

/// Decode a dictionary artifact into rows of `width` strings.
pub fn decode_dictionary_rows(bytes: &[u8], width: usize) -> Result<Vec<Vec<String>>, DataRowError> {
    if width == 0 {
        return Err(DataRowError::Malformed("dictionary width must be positive".to_string()));
    }
    let mut reader = DataRowReader::new(bytes);
    let mut rows = Vec::new();
    while !reader.is_at_end() {
        let mut row = Vec::with_capacity(width);
        for _ in 0..width {
            row.push(reader.read_string()?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Tab-separated text: a header line of field names, then one line per row.
pub fn format_data_rows(schema: &TableSchema, rows: &[Vec<Value>]) -> String {
    let header: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
    let mut out = header.join("\t");
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = row.iter().map(Value::to_string).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

pub fn format_dictionary_rows(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, TableError> {
    std::fs::read(path).map_err(|e| TableError::io(path, e))
}

fn artifact_error(path: &Path, e: DataRowError) -> TableError {
    TableError::Artifact {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Decode the artifact at `path` with the schema of `processor` and render it as text.
pub fn dump_data_file(processor: &DataTableProcessor, path: &Path) -> Result<String, TableError> {
    let schema = processor.schema()?;
    let bytes = read_artifact(path)?;
    let rows = decode_data_rows(&schema, &bytes).map_err(|e| artifact_error(path, e))?;
    Ok(format_data_rows(&schema, &rows))
}

/// Decode a dictionary artifact; the row width is the number of non-comment columns.
pub fn dump_dictionary_file(processor: &DictionaryProcessor, path: &Path) -> Result<String, TableError> {
    let mut width = 0;
    for column in 0..processor.column_count() {
        if !processor.is_comment_column(column)? {
            width += 1;
        }
    }
    let bytes = read_artifact(path)?;
    let rows = decode_dictionary_rows(&bytes, width).map_err(|e| artifact_error(path, e))?;
    Ok(format_dictionary_rows(&rows))
}
