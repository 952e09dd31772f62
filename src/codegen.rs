//! Code generator: renders one Rust data-row type per data table.
//!
//! The output is a text template with placeholder tokens substituted in a fixed order.
//! Field order and decoder calls come from the same [`TableSchema`] the encoder walks,
//! so the generated `read_data_row` consumes exactly the fields the encoder wrote.
//!
//! ## Placeholders
//!
//! | Token | Replaced with |
//! |---|---|
//! | `__DATA_TABLE_CREATE_TIME__` | generation timestamp |
//! | `__DATA_TABLE_NAME_SPACE__` | runtime module path |
//! | `__DATA_TABLE_CLASS_NAME__` | class prefix + PascalCase table name |
//! | `__DATA_TABLE_COMMENT__` | table summary cell |
//! | `__DATA_TABLE_ID_COMMENT__` | comment cell of the id column |
//! | `__DATA_TABLE_FIELDS__` | struct storage |
//! | `__DATA_TABLE_PROPERTIES__` | one getter per Data column |
//! | `__DATA_TABLE_PARSER__` | text and binary row parsers |
//! | `__DATA_TABLE_PROPERTY_ARRAY__` | property collection accessors |

use crate::data_table::DataTableProcessor;
use crate::encoder::{discard, write_atomic};
use crate::error::TableError;
use crate::schema::{to_pascal_case, to_snake_case, FieldSchema, PropertyCollection, TableSchema, TypeTag};
use std::path::{Path, PathBuf};

/// Template shipped with the crate.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/data_row.rs.tmpl");
pub const DEFAULT_NAMESPACE: &str = "tablegen::runtime";
pub const DEFAULT_CLASS_PREFIX: &str = "DR";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Module path providing `DataRowReader`, `DataRowError`, `TextRowFields` and custom types.
    pub namespace: String,
    pub class_prefix: String,
    /// Wrapping characters the generated text parser trims from each field.
    pub trim_chars: Vec<char>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            namespace: DEFAULT_NAMESPACE.to_string(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            trim_chars: vec!['"'],
        }
    }
}

/// `("DR", "hero_skill")` -> `DRHeroSkill`.
pub fn class_name(class_prefix: &str, table_name: &str) -> String {
    format!("{}{}", class_prefix, to_pascal_case(table_name))
}

/// `DRHeroSkill` -> `dr_hero_skill.rs`.
pub fn code_file_name(class_name: &str) -> String {
    format!("{}.rs", to_snake_case(class_name))
}

/// How a getter hands out its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Copy,
    Str,
    Ref,
}

impl Access {
    fn of(type_tag: &TypeTag, keyword: &str) -> Access {
        if keyword != type_tag.rust_type() {
            return Access::Ref;
        }
        match type_tag {
            TypeTag::String => Access::Str,
            t if t.is_copy() => Access::Copy,
            _ => Access::Ref,
        }
    }

    fn return_type(self, keyword: &str) -> String {
        match self {
            Access::Copy => keyword.to_string(),
            Access::Str => "&str".to_string(),
            Access::Ref => format!("&{}", keyword),
        }
    }

    fn borrow(self, place: &str) -> String {
        match self {
            Access::Copy => place.to_string(),
            Access::Str | Access::Ref => format!("&{}", place),
        }
    }

    fn owned(self, place: &str) -> String {
        match self {
            Access::Copy => place.to_string(),
            Access::Str | Access::Ref => format!("{}.clone()", place),
        }
    }

    fn from_item(self) -> &'static str {
        match self {
            Access::Copy => "*value",
            Access::Str => "value.as_str()",
            Access::Ref => "value",
        }
    }
}

fn doc_line(indent: &str, text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(format!("{}/// {}", indent, text))
    }
}

/// Value expression for a struct literal; overridden keywords convert with `Into`.
fn convert(f: &FieldSchema, call: String) -> String {
    if f.keyword == f.type_tag.rust_type() {
        format!("{}?", call)
    } else {
        format!("{}?.into()", call)
    }
}

fn items_field(c: &PropertyCollection) -> String {
    format!("{}_items", to_snake_case(&c.name))
}

fn generate_fields(schema: &TableSchema, collections: &[PropertyCollection]) -> String {
    let mut lines: Vec<String> = schema
        .data_fields()
        .map(|f| format!("    {}: {},", f.ident(), f.keyword))
        .collect();
    for c in collections {
        lines.push(format!("    {}: Vec<(i32, {})>,", items_field(c), c.keyword));
    }
    lines.join("\n")
}

/// Joins impl items with one blank line before each; empty when there are none.
fn blocks(items: Vec<String>) -> String {
    items
        .iter()
        .map(|item| format!("\n{}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_properties(schema: &TableSchema) -> String {
    let mut items = Vec::new();
    for f in schema.data_fields() {
        let access = Access::of(&f.type_tag, &f.keyword);
        let ident = f.ident();
        let mut item = String::new();
        if let Some(doc) = doc_line("    ", &f.comment) {
            item.push_str(&doc);
            item.push('\n');
        }
        item.push_str(&format!(
            "    pub fn {}(&self) -> {} {{\n        {}\n    }}",
            ident,
            access.return_type(&f.keyword),
            access.borrow(&format!("self.{}", ident))
        ));
        items.push(item);
    }
    blocks(items)
}

/// Struct literal closing a parser; `values` are `(field, expression)` in column order.
fn construct(values: &[(String, String)], collections: &[PropertyCollection]) -> String {
    let mut lines = Vec::new();
    for (field, expr) in values {
        lines.push(format!("            {}: {},", field, expr));
    }
    if collections.is_empty() {
        return format!("        Ok(Self {{\n{}\n        }})", lines.join("\n"));
    }
    for c in collections {
        lines.push(format!("            {}: Vec::new(),", items_field(c)));
    }
    format!(
        "        let mut row = Self {{\n{}\n        }};\n        row.generate_property_array();\n        Ok(row)",
        lines.join("\n")
    )
}

fn generate_parser(
    schema: &TableSchema,
    collections: &[PropertyCollection],
    options: &CodegenOptions,
) -> Result<String, TableError> {
    let id = schema
        .id_field()
        .ok_or_else(|| TableError::Configuration("table has no id column".to_string()))?;
    let ns = options.namespace.as_str();

    let mut text_values = vec![("id".to_string(), format!("{}?", id.type_tag.text_call(ns, id.column)))];
    let mut binary_values = vec![("id".to_string(), format!("{}?", id.type_tag.reader_call(ns)))];
    for f in schema.data_fields() {
        text_values.push((f.ident(), convert(f, f.type_tag.text_call(ns, f.column))));
        binary_values.push((f.ident(), convert(f, f.type_tag.reader_call(ns))));
    }

    let trim_chars: Vec<String> = options.trim_chars.iter().map(|c| format!("{:?}", c)).collect();
    let text_parser = format!(
        "    pub fn parse_data_row(data_row_string: &str) -> Result<Self, DataRowError> {{\n\
         \x20       let mut fields = TextRowFields::new(data_row_string, &[{}]);\n\
         {}\n\
         \x20   }}",
        trim_chars.join(", "),
        construct(&text_values, collections)
    );
    let bytes_parser = "    pub fn parse_data_row_bytes(data_row_bytes: &[u8]) -> Result<Self, DataRowError> {\n\
         \x20       let mut reader = DataRowReader::new(data_row_bytes);\n\
         \x20       let row = Self::read_data_row(&mut reader)?;\n\
         \x20       if !reader.is_at_end() {\n\
         \x20           return Err(DataRowError::Malformed(format!(\n\
         \x20               \"{} trailing bytes after row\",\n\
         \x20               data_row_bytes.len() - reader.position()\n\
         \x20           )));\n\
         \x20       }\n\
         \x20       Ok(row)\n\
         \x20   }";
    let reader_parser = format!(
        "    /// Read one record; records are stored back to back without delimiters.\n\
         \x20   pub fn read_data_row(reader: &mut DataRowReader<'_>) -> Result<Self, DataRowError> {{\n\
         {}\n\
         \x20   }}",
        construct(&binary_values, collections)
    );
    Ok(blocks(vec![text_parser, bytes_parser.to_string(), reader_parser]))
}

fn generate_property_array(schema: &TableSchema, collections: &[PropertyCollection]) -> String {
    if collections.is_empty() {
        return String::new();
    }
    let mut fill = Vec::new();
    let mut accessors = Vec::new();
    for c in collections {
        let group = to_snake_case(&c.name);
        let items = items_field(c);
        let access = Access::of(&c.type_tag, &c.keyword);
        let pairs: Vec<String> = c
            .items
            .iter()
            .filter_map(|item| {
                schema
                    .fields
                    .iter()
                    .find(|f| f.column == item.column)
                    .map(|f| (item.key, f))
            })
            .map(|(key, f)| format!("({}, {})", key, access.owned(&format!("self.{}", f.ident()))))
            .collect();
        fill.push(format!("        self.{} = vec![{}];", items, pairs.join(", ")));

        let ret = access.return_type(&c.keyword);
        let map = access.from_item();
        accessors.push(format!(
            "    pub fn {group}_count(&self) -> usize {{\n\
             \x20       self.{items}.len()\n\
             \x20   }}"
        ));
        accessors.push(format!(
            "    pub fn get_{group}(&self, id: i32) -> Result<{ret}, DataRowError> {{\n\
             \x20       self.{items}\n\
             \x20           .iter()\n\
             \x20           .find(|(key, _)| *key == id)\n\
             \x20           .map(|(_, value)| {map})\n\
             \x20           .ok_or(DataRowError::Lookup {{\n\
             \x20               accessor: \"get_{group}\",\n\
             \x20               key: id,\n\
             \x20           }})\n\
             \x20   }}"
        ));
        accessors.push(format!(
            "    pub fn get_{group}_at(&self, index: usize) -> Result<{ret}, DataRowError> {{\n\
             \x20       self.{items}\n\
             \x20           .get(index)\n\
             \x20           .map(|(_, value)| {map})\n\
             \x20           .ok_or(DataRowError::Range {{\n\
             \x20               accessor: \"get_{group}_at\",\n\
             \x20               index,\n\
             \x20           }})\n\
             \x20   }}"
        ));
    }
    let mut items = vec![format!(
        "    fn generate_property_array(&mut self) {{\n{}\n    }}",
        fill.join("\n")
    )];
    items.extend(accessors);
    blocks(items)
}

/// Replace a placeholder that stands on its own line; an empty value drops the line.
fn substitute_block(template: String, token: &str, value: &str) -> String {
    if value.is_empty() {
        template.replace(&format!("{}\n", token), "").replace(token, "")
    } else {
        template.replace(token, value)
    }
}

/// Empty comment cells leave `/// ` behind; strip trailing blanks from every line.
fn trim_line_ends(code: &str) -> String {
    let mut out = code.lines().map(str::trim_end).collect::<Vec<_>>().join("\n");
    if code.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Render the source file for one data table.
///
/// The schema must already have passed [`crate::lint::lint`]; names are not re-validated here.
pub fn generate_code(
    processor: &DataTableProcessor,
    table_name: &str,
    template: &str,
    options: &CodegenOptions,
    timestamp: &str,
) -> Result<String, TableError> {
    let schema = processor.schema()?;
    let collections = schema.property_collections().map_err(TableError::Identifier)?;
    let id_column = processor.layout().id_column;

    let code = template
        .replace("__DATA_TABLE_CREATE_TIME__", timestamp)
        .replace("__DATA_TABLE_NAME_SPACE__", &options.namespace)
        .replace("__DATA_TABLE_CLASS_NAME__", &class_name(&options.class_prefix, table_name))
        .replace("__DATA_TABLE_COMMENT__", processor.summary().trim())
        .replace("__DATA_TABLE_ID_COMMENT__", processor.comment(id_column)?.trim());
    let code = substitute_block(code, "__DATA_TABLE_FIELDS__", &generate_fields(&schema, &collections));
    let code = substitute_block(code, "__DATA_TABLE_PROPERTIES__", &generate_properties(&schema));
    let code = substitute_block(code, "__DATA_TABLE_PARSER__", &generate_parser(&schema, &collections, options)?);
    let code = substitute_block(
        code,
        "__DATA_TABLE_PROPERTY_ARRAY__",
        &generate_property_array(&schema, &collections),
    );
    Ok(trim_line_ends(&code))
}

/// Generate and write `<code_dir>/<file name>`, reading the template from `template_path`
/// (or [`DEFAULT_TEMPLATE`]). On failure any existing file at the target is removed.
pub fn generate_code_file(
    processor: &DataTableProcessor,
    table_name: &str,
    template_path: Option<&Path>,
    options: &CodegenOptions,
    timestamp: &str,
    code_dir: &Path,
) -> Result<PathBuf, TableError> {
    let path = code_path(code_dir, options, table_name);
    let result = read_template(template_path)
        .and_then(|template| generate_code(processor, table_name, &template, options, timestamp))
        .and_then(|code| write_atomic(&path, code.as_bytes()));
    match result {
        Ok(()) => Ok(path),
        Err(e) => {
            discard(&path);
            Err(e)
        }
    }
}

/// `<code_dir>/<file name>` of the row type generated for `table_name`.
pub fn code_path(code_dir: &Path, options: &CodegenOptions, table_name: &str) -> PathBuf {
    code_dir.join(code_file_name(&class_name(&options.class_prefix, table_name)))
}

pub fn read_template(path: Option<&Path>) -> Result<String, TableError> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| TableError::io(p, e)),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}
