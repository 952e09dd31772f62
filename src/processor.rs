//! Raw grid and the row/column queries shared by both table processors.
//!
//! A [`RawGrid`] is the rectangular cell matrix read from a tabular source. The
//! [`TableProcessor`] trait layers header-row interpretation on top of it: which row
//! names the columns, where content starts, and which rows/columns are comments.

use crate::error::TableError;
use crate::parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker that turns a row (first cell prefix) or a column (anywhere in its name) into a comment.
pub const COMMENT_MARKER: char = '#';

/// How cells are read from the tabular source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceFormat {
    /// Characters trimmed from both ends of every cell after splitting.
    pub trim_chars: Vec<char>,
}

impl Default for SourceFormat {
    fn default() -> Self {
        SourceFormat { trim_chars: vec!['"'] }
    }
}

/// Rectangular, immutable matrix of string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    /// Build a grid, rejecting rows whose cell count differs from the first row.
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        if let Some(first) = rows.first() {
            let width = first.len();
            if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
                return Err(TableError::Configuration(format!(
                    "raw column count is '{}', but row '{}' has '{}' columns",
                    width,
                    i,
                    row.len()
                )));
            }
        }
        Ok(RawGrid { rows })
    }

    /// Parse tabular source text into a grid.
    pub fn parse(source: &str, format: &SourceFormat) -> Result<Self, TableError> {
        let rows = parser::parse(source, &format.trim_chars).map_err(TableError::Configuration)?;
        RawGrid::new(rows)
    }

    /// Read and parse a tabular source file.
    pub fn read(path: &Path, format: &SourceFormat) -> Result<Self, TableError> {
        if !path.is_file() {
            return Err(TableError::Configuration(format!(
                "file '{}' does not exist",
                path.display()
            )));
        }
        let source = std::fs::read_to_string(path).map_err(|e| {
            TableError::Configuration(format!("file '{}' cannot be read: {}", path.display(), e))
        })?;
        RawGrid::parse(&source, format)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row(&self, row: usize) -> Result<&[String], TableError> {
        self.rows
            .get(row)
            .map(Vec::as_slice)
            .ok_or_else(|| TableError::Index(format!("raw row '{}' is out of range", row)))
    }

    pub fn cell(&self, row: usize, column: usize) -> Result<&str, TableError> {
        self.row(row)?
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| TableError::Index(format!("raw column '{}' is out of range", column)))
    }

    /// Fail with a configuration error unless `row` names an existing row.
    pub(crate) fn check_header_row(&self, label: &str, row: usize) -> Result<(), TableError> {
        if row >= self.row_count() {
            return Err(TableError::Configuration(format!(
                "{} row '{}' >= raw row count '{}' is not allowed",
                label,
                row,
                self.row_count()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_content_start_row(&self, row: usize) -> Result<(), TableError> {
        if row > self.row_count() {
            return Err(TableError::Configuration(format!(
                "content start row '{}' > raw row count '{}' is not allowed",
                row,
                self.row_count()
            )));
        }
        Ok(())
    }
}

/// Classification of a column. Exactly one applies to every column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Comment,
    Id,
    Data,
}

/// Row/column queries over a header-annotated grid.
///
/// All queries are pure and bounds-checked. Classification depends only on the name
/// row and the configured id column, both fixed at construction.
pub trait TableProcessor {
    fn grid(&self) -> &RawGrid;

    fn name_row(&self) -> usize;

    fn content_start_row(&self) -> usize;

    /// Column holding each row's integer key, if this variant has one.
    fn id_column(&self) -> Option<usize> {
        None
    }

    fn row_count(&self) -> usize {
        self.grid().row_count()
    }

    fn column_count(&self) -> usize {
        self.grid().column_count()
    }

    fn name(&self, column: usize) -> Result<&str, TableError> {
        self.grid().cell(self.name_row(), column)
    }

    fn value(&self, row: usize, column: usize) -> Result<&str, TableError> {
        self.grid().cell(row, column)
    }

    fn is_comment_row(&self, row: usize) -> Result<bool, TableError> {
        Ok(self.grid().row(row)?.first().is_some_and(|c| c.starts_with(COMMENT_MARKER)))
    }

    fn is_comment_column(&self, column: usize) -> Result<bool, TableError> {
        let name = self.name(column)?;
        Ok(name.is_empty() || name.contains(COMMENT_MARKER))
    }

    fn is_id_column(&self, column: usize) -> Result<bool, TableError> {
        self.check_column(column)?;
        Ok(self.id_column() == Some(column))
    }

    fn column_kind(&self, column: usize) -> Result<ColumnKind, TableError> {
        if self.is_comment_column(column)? {
            Ok(ColumnKind::Comment)
        } else if self.is_id_column(column)? {
            Ok(ColumnKind::Id)
        } else {
            Ok(ColumnKind::Data)
        }
    }

    fn check_column(&self, column: usize) -> Result<(), TableError> {
        if column >= self.column_count() {
            return Err(TableError::Index(format!("raw column '{}' is out of range", column)));
        }
        Ok(())
    }

    /// Content rows in ascending order, comment rows excluded.
    fn content_rows(&self) -> Result<Vec<usize>, TableError> {
        let mut rows = Vec::new();
        for row in self.content_start_row()..self.row_count() {
            if !self.is_comment_row(row)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}
