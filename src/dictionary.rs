//! Dictionary processor: flat key/value tables with a single name row and no type row.

use crate::error::TableError;
use crate::processor::{RawGrid, SourceFormat, TableProcessor};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header layout of a dictionary-style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictionaryLayout {
    pub name_row: usize,
    pub content_start_row: usize,
}

impl Default for DictionaryLayout {
    fn default() -> Self {
        DictionaryLayout {
            name_row: 0,
            content_start_row: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DictionaryProcessor {
    grid: RawGrid,
    layout: DictionaryLayout,
}

impl DictionaryProcessor {
    pub fn new(grid: RawGrid, layout: DictionaryLayout) -> Result<Self, TableError> {
        grid.check_header_row("name", layout.name_row)?;
        grid.check_content_start_row(layout.content_start_row)?;
        Ok(DictionaryProcessor { grid, layout })
    }

    pub fn from_source(
        source: &str,
        format: &SourceFormat,
        layout: DictionaryLayout,
    ) -> Result<Self, TableError> {
        DictionaryProcessor::new(RawGrid::parse(source, format)?, layout)
    }

    pub fn open(path: &Path, format: &SourceFormat, layout: DictionaryLayout) -> Result<Self, TableError> {
        DictionaryProcessor::new(RawGrid::read(path, format)?, layout)
    }
}

impl TableProcessor for DictionaryProcessor {
    fn grid(&self) -> &RawGrid {
        &self.grid
    }

    fn name_row(&self) -> usize {
        self.layout.name_row
    }

    fn content_start_row(&self) -> usize {
        self.layout.content_start_row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "Key\tValue\t#Note\n#skipped\tx\ty\nHello\tWorld\tgreeting\n";

    #[test]
    fn classifies_comment_rows_and_columns() {
        let p = DictionaryProcessor::from_source(SOURCE, &SourceFormat::default(), DictionaryLayout::default())
            .expect("processor");
        assert_eq!(p.row_count(), 3);
        assert_eq!(p.column_count(), 3);
        assert!(p.is_comment_row(1).expect("row"));
        assert!(!p.is_comment_row(2).expect("row"));
        assert!(p.is_comment_column(2).expect("column"));
        assert!(!p.is_id_column(0).expect("column"));
        assert_eq!(p.content_rows().expect("rows"), vec![2]);
    }

    #[test]
    fn name_row_out_of_range_is_rejected() {
        let layout = DictionaryLayout {
            name_row: 3,
            content_start_row: 1,
        };
        let err = DictionaryProcessor::from_source(SOURCE, &SourceFormat::default(), layout).expect_err("bad");
        assert!(matches!(err, TableError::Configuration(_)));
    }

    #[test]
    fn content_start_may_equal_row_count() {
        let layout = DictionaryLayout {
            name_row: 0,
            content_start_row: 3,
        };
        let p = DictionaryProcessor::from_source(SOURCE, &SourceFormat::default(), layout).expect("processor");
        assert!(p.content_rows().expect("rows").is_empty());
        let layout = DictionaryLayout {
            name_row: 0,
            content_start_row: 4,
        };
        assert!(DictionaryProcessor::from_source(SOURCE, &SourceFormat::default(), layout).is_err());
    }
}
