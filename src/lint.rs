//! Semantic validation of data-table column names.
//!
//! ## Rules
//!
//! - **Identifier**: every Data column name starts with an uppercase ASCII letter followed by
//!   letters, digits or underscores. Id and comment columns are exempt.
//! - **Reserved name**: a Data column may not map to a name the generated type already uses
//!   (`id`, the parse/read methods) or to an identifier Rust cannot express (`self`, `crate`, ...).
//! - **Duplicate name**: two emitted columns may not map to the same snake_case property.
//! - **Collection type**: all columns of one property collection share one type.
//! - **Collection key**: the numeric suffix must fit in `i32`.
//! - **Accessor collision**: a column may not map to a collection accessor name
//!   (`<group>_count`, `get_<group>`, `get_<group>_at`, `<group>_items`), and two collections
//!   may not generate the same accessor (`Reward1` and `RewardAt1` both need `get_reward_at`).
//! - **Duplicate key** (warning): two columns of one collection share a key; lookups return the first.
//!
//! Run the linter over table sources with the `lint_tables` binary.

use crate::schema::{to_snake_case, FieldRole, TableSchema, UNRAWABLE_IDENTS};
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::LazyLock;

static NAME_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").expect("valid regex"));

/// Names of items every generated row type defines itself.
const GENERATED_ITEMS: &[&str] = &[
    "id",
    "parse_data_row",
    "parse_data_row_bytes",
    "read_data_row",
    "generate_property_array",
];

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    InvalidIdentifier,
    ReservedName,
    DuplicateName,
    MixedCollectionType,
    InvalidCollectionKey,
    AccessorCollision,
    DuplicateCollectionKey,
}

impl LintRule {
    pub fn id(self) -> &'static str {
        match self {
            LintRule::InvalidIdentifier => "invalid-identifier",
            LintRule::ReservedName => "reserved-name",
            LintRule::DuplicateName => "duplicate-name",
            LintRule::MixedCollectionType => "mixed-collection-type",
            LintRule::InvalidCollectionKey => "invalid-collection-key",
            LintRule::AccessorCollision => "accessor-collision",
            LintRule::DuplicateCollectionKey => "duplicate-collection-key",
        }
    }
}

/// A single lint message, located by raw column index.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub column: usize,
    pub name: String,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// True when `name` satisfies the identifier rule.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RULE.is_match(name)
}

/// Run all rules over a table schema. Messages are ordered by column.
pub fn lint(schema: &TableSchema) -> Vec<LintMessage> {
    let mut out = Vec::new();
    let mut push = |column: usize, name: &str, rule: LintRule, severity: Severity, message: String| {
        out.push(LintMessage {
            column,
            name: name.to_string(),
            rule,
            severity,
            message,
        });
    };

    let mut seen: HashMap<String, &str> = HashMap::new();
    for f in &schema.fields {
        let snake = to_snake_case(&f.name);
        if f.role == FieldRole::Data {
            if !is_valid_name(&f.name) {
                push(
                    f.column,
                    &f.name,
                    LintRule::InvalidIdentifier,
                    Severity::Error,
                    format!("name '{}' must match [A-Z][A-Za-z0-9_]*", f.name),
                );
                continue;
            }
            if GENERATED_ITEMS.contains(&snake.as_str()) || UNRAWABLE_IDENTS.contains(&snake.as_str()) {
                push(
                    f.column,
                    &f.name,
                    LintRule::ReservedName,
                    Severity::Error,
                    format!("name '{}' maps to reserved identifier '{}'", f.name, snake),
                );
                continue;
            }
        }
        if let Some(other) = seen.insert(snake.clone(), &f.name) {
            push(
                f.column,
                &f.name,
                LintRule::DuplicateName,
                Severity::Error,
                format!("name '{}' and '{}' both map to '{}'", other, f.name, snake),
            );
        }
    }

    let collections = match schema.property_collections() {
        Ok(c) => c,
        Err(message) => {
            let (column, name) = schema
                .data_fields()
                .find(|f| message.contains(&f.name))
                .map(|f| (f.column, f.name.as_str()))
                .unwrap_or((0, ""));
            push(column, name, LintRule::InvalidCollectionKey, Severity::Error, message);
            return sorted(out);
        }
    };

    let mut owners: HashMap<String, &str> = HashMap::new();
    for c in &collections {
        let group = to_snake_case(&c.name);
        let accessors = [
            format!("{}_count", group),
            format!("get_{}", group),
            format!("get_{}_at", group),
            format!("{}_items", group),
        ];
        for f in &schema.fields {
            let snake = to_snake_case(&f.name);
            if accessors.contains(&snake) {
                push(
                    f.column,
                    &f.name,
                    LintRule::AccessorCollision,
                    Severity::Error,
                    format!("name '{}' collides with accessor '{}' of collection '{}'", f.name, snake, c.name),
                );
            }
        }
        if let Some(first) = c.items.first() {
            for accessor in &accessors {
                match owners.entry(accessor.clone()) {
                    Entry::Occupied(owner) => push(
                        first.column,
                        &first.name,
                        LintRule::AccessorCollision,
                        Severity::Error,
                        format!(
                            "collections '{}' and '{}' both generate '{}'",
                            owner.get(),
                            c.name,
                            accessor
                        ),
                    ),
                    Entry::Vacant(slot) => {
                        slot.insert(&c.name);
                    }
                }
            }
        }

        let mut keys: HashMap<i32, &str> = HashMap::new();
        for item in &c.items {
            if let Some(f) = schema.fields.iter().find(|f| f.column == item.column) {
                if f.type_tag != c.type_tag || f.keyword != c.keyword {
                    push(
                        item.column,
                        &item.name,
                        LintRule::MixedCollectionType,
                        Severity::Error,
                        format!(
                            "column '{}' is {} but collection '{}' is {}",
                            item.name, f.keyword, c.name, c.keyword
                        ),
                    );
                }
            }
            if let Some(first) = keys.insert(item.key, &item.name) {
                push(
                    item.column,
                    &item.name,
                    LintRule::DuplicateCollectionKey,
                    Severity::Warning,
                    format!("columns '{}' and '{}' share key {}", first, item.name, item.key),
                );
            }
        }
    }

    sorted(out)
}

fn sorted(mut messages: Vec<LintMessage>) -> Vec<LintMessage> {
    messages.sort_by_key(|m| m.column);
    messages
}

/// Error-level findings only.
pub fn errors(messages: &[LintMessage]) -> impl Iterator<Item = &LintMessage> {
    messages.iter().filter(|m| m.severity == Severity::Error)
}
