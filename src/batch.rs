//! Batch orchestration: process a list of tables, isolating failures per table.
//!
//! Each table gets its own processor; an error in one table is logged, recorded in the
//! [`BatchReport`] and the loop moves on. Only batch-level setup (creating output
//! directories) can fail the whole run.

use crate::codegen::{self, CodegenOptions};
use crate::config::GeneratorConfig;
use crate::data_table::DataTableProcessor;
use crate::dictionary::{DictionaryLayout, DictionaryProcessor};
use crate::encoder;
use crate::error::TableError;
use crate::lint::{self, Severity};
use crate::processor::SourceFormat;
use crate::schema::TypeRegistry;
use std::path::{Path, PathBuf};

pub const LOG_TARGET: &str = "tablegen";

/// Which artifacts a data-table batch produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataTableTargets {
    Data,
    Code,
    #[default]
    Both,
}

impl DataTableTargets {
    pub fn data(self) -> bool {
        matches!(self, DataTableTargets::Data | DataTableTargets::Both)
    }

    pub fn code(self) -> bool {
        matches!(self, DataTableTargets::Code | DataTableTargets::Both)
    }
}

#[derive(Debug)]
pub struct TableFailure {
    pub name: String,
    pub error: TableError,
}

/// Outcome of one batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<TableFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, kind: &str, name: &str, result: Result<(), TableError>) {
        match result {
            Ok(()) => {
                log::info!(target: LOG_TARGET, "generated {} '{}'", kind, name);
                self.succeeded.push(name.to_string());
            }
            Err(error) => {
                log::error!(target: LOG_TARGET, "{} '{}' failed: {}", kind, name, error);
                self.failed.push(TableFailure {
                    name: name.to_string(),
                    error,
                });
            }
        }
    }

    fn finish(self, kind: &str) -> Self {
        log::info!(
            target: LOG_TARGET,
            "{} batch: {} generated, {} failed",
            kind,
            self.succeeded.len(),
            self.failed.len()
        );
        self
    }
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), TableError> {
    std::fs::create_dir_all(dir).map_err(|e| TableError::io(dir, e))
}

/// Validate column names; warnings are logged, errors fail the table.
fn check_names(name: &str, processor: &DataTableProcessor) -> Result<(), TableError> {
    let messages = lint::lint(&processor.schema()?);
    let mut errors = Vec::new();
    for m in &messages {
        match m.severity {
            Severity::Warning => {
                log::warn!(target: LOG_TARGET, "{}: column {}: {}", name, m.column, m.message)
            }
            Severity::Error => errors.push(format!("column {}: {}", m.column, m.message)),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TableError::Identifier(errors.join("; ")))
    }
}

/// Everything a data-table batch needs besides the table names.
#[derive(Debug, Clone)]
pub struct DataTableJob<'a> {
    pub config: &'a GeneratorConfig,
    pub types: &'a TypeRegistry,
    pub targets: DataTableTargets,
    pub timestamp: String,
}

impl DataTableJob<'_> {
    /// Process one table: open, validate names, then write the requested artifacts.
    ///
    /// A table that fails to open or validate loses both artifacts from earlier runs. After
    /// that the data and code steps run independently; the first error is returned.
    pub fn process(&self, name: &str) -> Result<(), TableError> {
        let settings = &self.config.data_tables;
        let options: CodegenOptions = self.config.codegen_options();
        let data_path = settings.data_path(name);
        let code_path = codegen::code_path(&self.config.code.code_dir, &options, name);

        let processor = DataTableProcessor::open(
            &settings.source_path(name),
            &self.config.source,
            settings.layout,
            self.types,
        )
        .and_then(|processor| check_names(name, &processor).map(|()| processor));
        let processor = match processor {
            Ok(p) => p,
            Err(e) => {
                if self.targets.data() {
                    encoder::discard(&data_path);
                }
                if self.targets.code() {
                    encoder::discard(&code_path);
                }
                return Err(e);
            }
        };

        let data = if self.targets.data() {
            encoder::generate_data_file(&processor, &data_path).map(|size| {
                log::debug!(target: LOG_TARGET, "wrote {} bytes to {}", size, data_path.display());
            })
        } else {
            Ok(())
        };
        let code = if self.targets.code() {
            codegen::generate_code_file(
                &processor,
                name,
                self.config.code.template.as_deref(),
                &options,
                &self.timestamp,
                &self.config.code.code_dir,
            )
            .map(|path| log::debug!(target: LOG_TARGET, "wrote {}", path.display()))
        } else {
            Ok(())
        };
        match (data, code) {
            (Err(e), Err(code_error)) => {
                log::error!(target: LOG_TARGET, "{}: code file also failed: {}", name, code_error);
                Err(e)
            }
            (data, code) => data.and(code),
        }
    }

    pub fn run(&self, names: &[String]) -> Result<BatchReport, TableError> {
        if self.targets.data() {
            ensure_dir(&self.config.data_tables.output_dir)?;
        }
        if self.targets.code() {
            ensure_dir(&self.config.code.code_dir)?;
        }
        let mut report = BatchReport::default();
        for name in names {
            log::info!(target: LOG_TARGET, "generate data table '{}'", name);
            report.record("data table", name, self.process(name));
        }
        Ok(report.finish("data table"))
    }
}

struct DictionaryJob<'a> {
    kind: &'static str,
    format: &'a SourceFormat,
    layout: DictionaryLayout,
    output_dir: &'a Path,
    source_path: &'a dyn Fn(&str) -> PathBuf,
    data_path: &'a dyn Fn(&str) -> PathBuf,
}

impl DictionaryJob<'_> {
    fn process(&self, name: &str) -> Result<(), TableError> {
        let processor = DictionaryProcessor::open(&(self.source_path)(name), self.format, self.layout)?;
        encoder::generate_data_file(&processor, &(self.data_path)(name))?;
        Ok(())
    }

    fn run(&self, names: &[String]) -> Result<BatchReport, TableError> {
        ensure_dir(self.output_dir)?;
        let mut report = BatchReport::default();
        for name in names {
            log::info!(target: LOG_TARGET, "generate {} '{}'", self.kind, name);
            report.record(self.kind, name, self.process(name));
        }
        Ok(report.finish(self.kind))
    }
}

/// Encode every dictionary in `names`.
pub fn run_dictionaries(config: &GeneratorConfig, names: &[String]) -> Result<BatchReport, TableError> {
    let s = &config.dictionaries;
    DictionaryJob {
        kind: "dictionary",
        format: &config.source,
        layout: s.layout,
        output_dir: &s.output_dir,
        source_path: &|n| s.source_path(n),
        data_path: &|n| s.data_path(n),
    }
    .run(names)
}

/// Encode every config table in `names`.
pub fn run_configs(config: &GeneratorConfig, names: &[String]) -> Result<BatchReport, TableError> {
    let s = &config.configs;
    DictionaryJob {
        kind: "config",
        format: &config.source,
        layout: s.layout,
        output_dir: &s.output_dir,
        source_path: &|n| s.source_path(n),
        data_path: &|n| s.data_path(n),
    }
    .run(names)
}
