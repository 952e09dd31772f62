//! Data table processor: typed tables with name, type, comment and optional
//! language-keyword header rows plus a designated integer id column.

use crate::error::TableError;
use crate::processor::{RawGrid, SourceFormat, TableProcessor};
use crate::schema::{FieldRole, FieldSchema, TableSchema, TypeRegistry, TypeTag};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header layout of a data table. Rows and columns are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataTableLayout {
    pub name_row: usize,
    pub type_row: usize,
    /// When set, the property type text is read from this row instead of derived from the type.
    pub language_keyword_row: Option<usize>,
    pub comment_row: usize,
    pub content_start_row: usize,
    pub id_column: usize,
    /// Cell holding the table's one-line description.
    pub summary_row: usize,
    pub summary_column: usize,
}

impl Default for DataTableLayout {
    fn default() -> Self {
        DataTableLayout {
            name_row: 1,
            type_row: 2,
            language_keyword_row: None,
            comment_row: 3,
            content_start_row: 4,
            id_column: 1,
            summary_row: 0,
            summary_column: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataTableProcessor {
    grid: RawGrid,
    layout: DataTableLayout,
    /// Resolved type per column; `None` for comment columns.
    column_types: Vec<Option<TypeTag>>,
}

impl DataTableProcessor {
    pub fn new(grid: RawGrid, layout: DataTableLayout, types: &TypeRegistry) -> Result<Self, TableError> {
        grid.check_header_row("name", layout.name_row)?;
        grid.check_header_row("type", layout.type_row)?;
        grid.check_header_row("comment", layout.comment_row)?;
        if let Some(row) = layout.language_keyword_row {
            grid.check_header_row("language keyword", row)?;
        }
        grid.check_content_start_row(layout.content_start_row)?;
        if layout.id_column >= grid.column_count() {
            return Err(TableError::Configuration(format!(
                "id column '{}' >= raw column count '{}' is not allowed",
                layout.id_column,
                grid.column_count()
            )));
        }

        let mut processor = DataTableProcessor {
            grid,
            layout,
            column_types: Vec::new(),
        };
        if processor.is_comment_column(layout.id_column)? {
            return Err(TableError::Configuration(format!(
                "id column '{}' is a comment column",
                layout.id_column
            )));
        }

        let mut column_types = Vec::with_capacity(processor.column_count());
        for column in 0..processor.column_count() {
            if processor.is_comment_column(column)? {
                column_types.push(None);
                continue;
            }
            let keyword = processor.type_name(column)?;
            let tag = types.resolve(keyword).ok_or_else(|| {
                TableError::Configuration(format!(
                    "column '{}' has unsupported type '{}'",
                    processor.name(column).unwrap_or_default(),
                    keyword
                ))
            })?;
            if column == layout.id_column && tag != TypeTag::Int32 {
                return Err(TableError::Configuration(format!(
                    "id column '{}' must be int, found '{}'",
                    column, keyword
                )));
            }
            column_types.push(Some(tag));
        }
        processor.column_types = column_types;
        Ok(processor)
    }

    pub fn from_source(
        source: &str,
        format: &SourceFormat,
        layout: DataTableLayout,
        types: &TypeRegistry,
    ) -> Result<Self, TableError> {
        DataTableProcessor::new(RawGrid::parse(source, format)?, layout, types)
    }

    pub fn open(
        path: &Path,
        format: &SourceFormat,
        layout: DataTableLayout,
        types: &TypeRegistry,
    ) -> Result<Self, TableError> {
        DataTableProcessor::new(RawGrid::read(path, format)?, layout, types)
    }

    pub fn layout(&self) -> &DataTableLayout {
        &self.layout
    }

    /// Raw text of the type row.
    pub fn type_name(&self, column: usize) -> Result<&str, TableError> {
        self.grid.cell(self.layout.type_row, column)
    }

    /// Resolved type; `None` for comment columns.
    pub fn declared_type(&self, column: usize) -> Result<Option<&TypeTag>, TableError> {
        self.check_column(column)?;
        Ok(self.column_types.get(column).and_then(Option::as_ref))
    }

    /// True for builtin types, false for registered custom types and comment columns.
    pub fn is_builtin_type(&self, column: usize) -> Result<bool, TableError> {
        Ok(self.declared_type(column)?.is_some_and(TypeTag::is_builtin))
    }

    /// Rust type text of the property generated for `column`.
    pub fn language_keyword(&self, column: usize) -> Result<String, TableError> {
        if let Some(row) = self.layout.language_keyword_row {
            let keyword = self.grid.cell(row, column)?;
            if !keyword.is_empty() {
                return Ok(keyword.to_string());
            }
        }
        match self.declared_type(column)? {
            Some(t) => Ok(t.rust_type().to_string()),
            None => Ok(self.type_name(column)?.to_string()),
        }
    }

    pub fn comment(&self, column: usize) -> Result<&str, TableError> {
        self.grid.cell(self.layout.comment_row, column)
    }

    /// The table description cell, or empty when the grid does not reach it.
    pub fn summary(&self) -> &str {
        self.grid
            .cell(self.layout.summary_row, self.layout.summary_column)
            .unwrap_or_default()
    }

    /// The ordered Id/Data field list shared by the encoder and the code generator.
    pub fn schema(&self) -> Result<TableSchema, TableError> {
        let mut fields = Vec::new();
        for column in 0..self.column_count() {
            let Some(type_tag) = self.declared_type(column)? else {
                continue;
            };
            let role = if self.is_id_column(column)? {
                FieldRole::Id
            } else {
                FieldRole::Data
            };
            fields.push(FieldSchema {
                column,
                name: self.name(column)?.to_string(),
                role,
                type_tag: type_tag.clone(),
                keyword: self.language_keyword(column)?,
                comment: self.comment(column)?.to_string(),
            });
        }
        Ok(TableSchema {
            column_count: self.column_count(),
            fields,
        })
    }
}

impl TableProcessor for DataTableProcessor {
    fn grid(&self) -> &RawGrid {
        &self.grid
    }

    fn name_row(&self) -> usize {
        self.layout.name_row
    }

    fn content_start_row(&self) -> usize {
        self.layout.content_start_row
    }

    fn id_column(&self) -> Option<usize> {
        Some(self.layout.id_column)
    }
}
