//! # tablegen: table schema compiler
//!
//! Reads tab-delimited tables whose header rows declare column names, types and comments,
//! and produces two artifacts from the same processor instance:
//!
//! - a compact binary file holding every content row, and
//! - a generated Rust row type that parses that binary form (and the text form) back.
//!
//! A simpler dictionary processor emits only the binary side for flat key/value tables.
//!
//! ## Data table layout (defaults)
//!
//! ```text
//! #   Heroes                                  <- row 0: summary cell (column 1)
//! #   Id       #Note     Name     Position    <- row 1: names; '#' or empty marks a comment column
//! #   int                string   Vector3     <- row 2: types
//! #   Hero id  memo      Shown    Spawn       <- row 3: comments
//!     1        first     Alice    1,2,3       <- row 4..: content; first cell '#' marks a comment row
//! ```
//!
//! ## Binary form
//!
//! Records are concatenated with no delimiters: the id as a 7-bit encoded varint, then every
//! Data column in ascending column order. Integers of every width are varints, floats are
//! little-endian, `bool`/`u8`/`i8` are one byte, strings are a varint byte length plus UTF-8.
//! Custom types write their components in order.
//!
//! ## Usage
//!
//! The `tablegen` binary runs whole batches from a manifest; `lint_tables` checks column
//! names. See `tests/integration.rs` for the library API end to end.

pub mod batch;
pub mod codec;
pub mod codegen;
pub mod config;
pub mod data_table;
pub mod dictionary;
pub mod dump;
pub mod encoder;
pub mod error;
pub mod lint;
pub mod manifest;
pub mod parser;
pub mod processor;
pub mod runtime;
pub mod schema;
pub mod value;

pub use batch::{BatchReport, DataTableJob, DataTableTargets};
pub use codegen::{generate_code, CodegenOptions};
pub use config::GeneratorConfig;
pub use data_table::{DataTableLayout, DataTableProcessor};
pub use dictionary::{DictionaryLayout, DictionaryProcessor};
pub use encoder::{generate_data_file, RowEncoder};
pub use error::TableError;
pub use processor::{ColumnKind, RawGrid, SourceFormat, TableProcessor};
pub use schema::{CustomType, TableSchema, TypeRegistry, TypeTag};
pub use value::Value;
