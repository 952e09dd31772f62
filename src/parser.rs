//! Parse tab-delimited tabular source into rows of cells using PEST.

use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct TabularParser;

/// Parse tabular source into rows of cells, trimming `trim_chars` from both ends of every cell.
///
/// A leading UTF-8 byte order mark is ignored. Rows are not checked for equal width here;
/// that is the grid's job.
pub fn parse(source: &str, trim_chars: &[char]) -> Result<Vec<Vec<String>>, String> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let pairs = TabularParser::parse(Rule::table, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let table = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut rows = Vec::new();
    for inner in table.into_inner() {
        if inner.as_rule() == Rule::row {
            rows.push(build_row(inner, trim_chars));
        }
    }
    Ok(rows)
}

fn build_row(pair: pest::iterators::Pair<Rule>, trim_chars: &[char]) -> Vec<String> {
    pair.into_inner()
        .filter(|cell| cell.as_rule() == Rule::cell)
        .map(|cell| trim_cell(cell.as_str(), trim_chars).to_string())
        .collect()
}

/// Trim wrapping characters (e.g. quotation marks) from both ends of a cell.
pub fn trim_cell<'a>(cell: &'a str, trim_chars: &[char]) -> &'a str {
    cell.trim_matches(|c| trim_chars.contains(&c))
}
