//! Error taxonomy for table processing, encoding and code generation.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Malformed processor setup: bad header indices, ragged grid, unknown type, missing source.
    #[error("Configuration: {0}")]
    Configuration(String),
    /// Row or column index outside the grid.
    #[error("Index: {0}")]
    Index(String),
    /// One or more column names failed semantic validation.
    #[error("Identifier: {0}")]
    Identifier(String),
    /// A cell could not be converted to its declared type.
    #[error("Conversion at row {row}, column {column}: {message}")]
    Conversion {
        row: usize,
        column: usize,
        message: String,
    },
    /// A binary artifact does not decode with its table's schema.
    #[error("Artifact {}: {message}", path.display())]
    Artifact { path: PathBuf, message: String },
    #[error("IO: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TableError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        TableError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
