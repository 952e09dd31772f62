//! Lint data-table sources: column identifiers, reserved names, property collections.
//!
//! Usage:
//!   lint_tables [OPTIONS] FILE.txt ...
//!
//! Options:
//!   --config, -c PATH   Read the header layout and trim characters from a config file
//!   --human, -H         Human-readable output
//!
//! Exits with status 1 when any file fails to load or has an error-level finding.

use clap::Parser;
use std::path::PathBuf;
use tablegen::config::GeneratorConfig;
use tablegen::lint::{errors, lint, LintMessage, Severity};
use tablegen::schema::TypeRegistry;
use tablegen::DataTableProcessor;

#[derive(Parser, Debug)]
#[command(name = "lint_tables", version, about = "Lint data-table column names")]
struct Args {
    /// Configuration file [default: tablegen.toml when present]
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Human-readable output
    #[arg(long, short = 'H')]
    human: bool,

    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

fn print_message(path: &str, m: &LintMessage, style: OutputStyle) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match style {
        OutputStyle::Compact => {
            println!(
                "{}:{}: {}: {} [{}]",
                path,
                m.column,
                severity_str,
                m.message,
                m.rule.id()
            );
        }
        OutputStyle::Human => {
            println!("  {} column {} ({}): {}", path, m.column, m.name, m.message);
            println!("    rule: {}", m.rule.id());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let style = if args.human {
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };
    let cwd = std::env::current_dir()?;
    let config = GeneratorConfig::load(&cwd, args.config.as_deref())?;
    let types = TypeRegistry::default();

    let mut has_error = false;
    let mut total_warnings = 0usize;
    let mut total_errors = 0usize;

    for path in &args.files {
        let display_path = path.display().to_string();
        let schema = match DataTableProcessor::open(path, &config.source, config.data_tables.layout, &types)
            .and_then(|p| p.schema())
        {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {}", display_path, e);
                has_error = true;
                continue;
            }
        };
        let messages = lint(&schema);
        for m in &messages {
            match m.severity {
                Severity::Error => total_errors += 1,
                Severity::Warning => total_warnings += 1,
            }
            print_message(&display_path, m, style);
        }
        if errors(&messages).next().is_some() {
            has_error = true;
        }
    }

    if total_errors > 0 || total_warnings > 0 {
        eprintln!("lint: {} error(s), {} warning(s)", total_errors, total_warnings);
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
