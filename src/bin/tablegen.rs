//! Generate binary row files and row types from tab-delimited tables.
//!
//! Usage:
//!   tablegen [--config PATH] [--log-level LEVEL] data-tables [--only data|code] [NAME ...]
//!   tablegen dictionaries [NAME ...]
//!   tablegen configs [NAME ...]
//!   tablegen dump data-table NAME
//!   tablegen dump dictionary NAME
//!   tablegen show-config
//!
//! Without names, each batch reads its manifest. Exits with status 1 when any table fails.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tablegen::batch::{self, BatchReport, DataTableJob, DataTableTargets};
use tablegen::codegen::timestamp_now;
use tablegen::config::GeneratorConfig;
use tablegen::dump;
use tablegen::manifest::load_manifest;
use tablegen::schema::TypeRegistry;
use tablegen::{DataTableProcessor, DictionaryProcessor};

#[derive(Parser, Debug)]
#[command(name = "tablegen", version, about = "Table schema compiler")]
struct Cli {
    /// Configuration file [default: tablegen.toml when present]
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate data files and row types for data tables
    DataTables {
        /// Produce only one kind of artifact
        #[arg(long, value_name = "KIND")]
        only: Option<Only>,
        /// Table names [default: the data-table manifest]
        names: Vec<String>,
    },
    /// Generate data files for dictionaries
    Dictionaries {
        names: Vec<String>,
    },
    /// Generate data files for config tables
    Configs {
        names: Vec<String>,
    },
    /// Decode a generated data file and print its rows
    Dump {
        kind: DumpKind,
        name: String,
    },
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Only {
    Data,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpKind {
    DataTable,
    Dictionary,
    Config,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    /// No logging output
    None,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}

fn names_or_manifest(names: Vec<String>, manifest: &std::path::Path) -> anyhow::Result<Vec<String>> {
    if !names.is_empty() {
        return Ok(names);
    }
    Ok(load_manifest(manifest)?)
}

fn print_summary(kind: &str, report: &BatchReport) {
    for failure in &report.failed {
        eprintln!("{} '{}': {}", kind, failure.name, failure.error);
    }
    println!(
        "{}: {} generated, {} failed",
        kind,
        report.succeeded.len(),
        report.failed.len()
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let cwd = std::env::current_dir().context("reading working directory")?;
    let config = GeneratorConfig::load(&cwd, cli.config.as_deref())?;
    let types = TypeRegistry::default();

    let (kind, report) = match cli.command {
        Command::DataTables { only, names } => {
            let names = names_or_manifest(names, &config.data_tables.manifest)?;
            let targets = match only {
                None => DataTableTargets::Both,
                Some(Only::Data) => DataTableTargets::Data,
                Some(Only::Code) => DataTableTargets::Code,
            };
            let job = DataTableJob {
                config: &config,
                types: &types,
                targets,
                timestamp: timestamp_now(),
            };
            ("data tables", job.run(&names)?)
        }
        Command::Dictionaries { names } => {
            let names = names_or_manifest(names, &config.dictionaries.manifest)?;
            ("dictionaries", batch::run_dictionaries(&config, &names)?)
        }
        Command::Configs { names } => {
            let names = names_or_manifest(names, &config.configs.manifest)?;
            ("configs", batch::run_configs(&config, &names)?)
        }
        Command::Dump { kind, name } => {
            let text = match kind {
                DumpKind::DataTable => {
                    let s = &config.data_tables;
                    let processor = DataTableProcessor::open(&s.source_path(&name), &config.source, s.layout, &types)?;
                    dump::dump_data_file(&processor, &s.data_path(&name))?
                }
                DumpKind::Dictionary => {
                    let s = &config.dictionaries;
                    let processor = DictionaryProcessor::open(&s.source_path(&name), &config.source, s.layout)?;
                    dump::dump_dictionary_file(&processor, &s.data_path(&name))?
                }
                DumpKind::Config => {
                    let s = &config.configs;
                    let processor = DictionaryProcessor::open(&s.source_path(&name), &config.source, s.layout)?;
                    dump::dump_dictionary_file(&processor, &s.data_path(&name))?
                }
            };
            print!("{}", text);
            return Ok(());
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
            return Ok(());
        }
    };

    print_summary(kind, &report);
    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
