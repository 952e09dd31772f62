//! Table schema: the closed set of column types and the ordered field list.
//!
//! [`TableSchema`] is the single description both the binary row encoder and the code
//! generator walk. Each [`TypeTag`] owns its text conversion, binary encoding, binary
//! decoding and the decoder call emitted into generated code, so the two sides share one
//! mapping instead of maintaining two.

use crate::codec::{self, DataRowReader};
use crate::runtime::{self, DataRowError, FromCell, TextRowFields};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+$").expect("valid regex"));

/// Column type declared in the type row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    Custom(CustomType),
}

/// A registered composite type: a fixed sequence of builtin scalar components.
///
/// The text form is the components joined by `,`; the binary form is each component in
/// order. Generated code converts it with `<namespace>::parse_<snake name>` and
/// `<namespace>::read_<snake name>`, which the namespace must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomType {
    pub name: String,
    pub rust_type: String,
    pub components: Vec<TypeTag>,
    pub is_copy: bool,
}

impl CustomType {
    pub fn new(name: &str, components: Vec<TypeTag>) -> Self {
        CustomType {
            name: name.to_string(),
            rust_type: name.to_string(),
            components,
            is_copy: true,
        }
    }

    pub fn parse_fn(&self) -> String {
        format!("parse_{}", to_snake_case(&self.name))
    }

    pub fn read_fn(&self) -> String {
        format!("read_{}", to_snake_case(&self.name))
    }
}

impl TypeTag {
    /// Resolve a builtin type keyword (case-insensitive).
    pub fn builtin(keyword: &str) -> Option<TypeTag> {
        let t = match keyword.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => TypeTag::Bool,
            "byte" | "u8" => TypeTag::Byte,
            "sbyte" | "i8" => TypeTag::SByte,
            "short" | "int16" | "i16" => TypeTag::Int16,
            "ushort" | "uint16" | "u16" => TypeTag::UInt16,
            "int" | "int32" | "i32" => TypeTag::Int32,
            "uint" | "uint32" | "u32" => TypeTag::UInt32,
            "long" | "int64" | "i64" => TypeTag::Int64,
            "ulong" | "uint64" | "u64" => TypeTag::UInt64,
            "float" | "single" | "f32" => TypeTag::Float,
            "double" | "f64" => TypeTag::Double,
            "string" => TypeTag::String,
            _ => return None,
        };
        Some(t)
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, TypeTag::Custom(_))
    }

    pub fn is_copy(&self) -> bool {
        match self {
            TypeTag::String => false,
            TypeTag::Custom(c) => c.is_copy,
            _ => true,
        }
    }

    /// Rust type of the generated property (custom types unqualified).
    pub fn rust_type(&self) -> &str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Byte => "u8",
            TypeTag::SByte => "i8",
            TypeTag::Int16 => "i16",
            TypeTag::UInt16 => "u16",
            TypeTag::Int32 => "i32",
            TypeTag::UInt32 => "u32",
            TypeTag::Int64 => "i64",
            TypeTag::UInt64 => "u64",
            TypeTag::Float => "f32",
            TypeTag::Double => "f64",
            TypeTag::String => "String",
            TypeTag::Custom(c) => &c.rust_type,
        }
    }

    /// Expression reading one value of this type from `reader` in generated code.
    pub fn reader_call(&self, namespace: &str) -> String {
        let method = match self {
            TypeTag::Bool => "read_bool",
            TypeTag::Byte => "read_u8",
            TypeTag::SByte => "read_i8",
            TypeTag::Int16 => "read_7bit_encoded_i16",
            TypeTag::UInt16 => "read_7bit_encoded_u16",
            TypeTag::Int32 => "read_7bit_encoded_i32",
            TypeTag::UInt32 => "read_7bit_encoded_u32",
            TypeTag::Int64 => "read_7bit_encoded_i64",
            TypeTag::UInt64 => "read_7bit_encoded_u64",
            TypeTag::Float => "read_f32",
            TypeTag::Double => "read_f64",
            TypeTag::String => "read_string",
            TypeTag::Custom(c) => return format!("{}::{}(reader)", namespace, c.read_fn()),
        };
        format!("reader.{}()", method)
    }

    /// Expression converting text column `column` of `fields` in generated code.
    pub fn text_call(&self, namespace: &str, column: usize) -> String {
        match self {
            TypeTag::Custom(c) => format!("fields.seek({}).next_with({}::{})", column, namespace, c.parse_fn()),
            other => format!("fields.seek({}).next::<{}>()", column, other.rust_type()),
        }
    }

    /// Convert a text cell to a value of this type.
    pub fn parse_text(&self, text: &str) -> Result<Value, String> {
        let v = match self {
            TypeTag::Bool => Value::Bool(bool::from_cell(text)?),
            TypeTag::Byte => Value::Byte(u8::from_cell(text)?),
            TypeTag::SByte => Value::SByte(i8::from_cell(text)?),
            TypeTag::Int16 => Value::Int16(i16::from_cell(text)?),
            TypeTag::UInt16 => Value::UInt16(u16::from_cell(text)?),
            TypeTag::Int32 => Value::Int32(i32::from_cell(text)?),
            TypeTag::UInt32 => Value::UInt32(u32::from_cell(text)?),
            TypeTag::Int64 => Value::Int64(i64::from_cell(text)?),
            TypeTag::UInt64 => Value::UInt64(u64::from_cell(text)?),
            TypeTag::Float => Value::Float(f32::from_cell(text)?),
            TypeTag::Double => Value::Double(f64::from_cell(text)?),
            TypeTag::String => Value::String(String::from_cell(text)?),
            TypeTag::Custom(c) => {
                let parts = runtime::split_components(text, &c.name, c.components.len())?;
                let mut out = Vec::with_capacity(parts.len());
                for (component, part) in c.components.iter().zip(parts) {
                    out.push(component.parse_text(part)?);
                }
                Value::Composite(out)
            }
        };
        Ok(v)
    }

    /// Append the binary form of `v`.
    pub fn encode(&self, v: &Value, w: &mut Vec<u8>) -> Result<(), String> {
        match (self, v) {
            (TypeTag::Bool, Value::Bool(x)) => codec::write_bool(w, *x),
            (TypeTag::Byte, Value::Byte(x)) => codec::write_u8(w, *x),
            (TypeTag::SByte, Value::SByte(x)) => codec::write_i8(w, *x),
            (TypeTag::Int16, Value::Int16(x)) => codec::write_7bit_encoded_i16(w, *x),
            (TypeTag::UInt16, Value::UInt16(x)) => codec::write_7bit_encoded_u16(w, *x),
            (TypeTag::Int32, Value::Int32(x)) => codec::write_7bit_encoded_i32(w, *x),
            (TypeTag::UInt32, Value::UInt32(x)) => codec::write_7bit_encoded_u32(w, *x),
            (TypeTag::Int64, Value::Int64(x)) => codec::write_7bit_encoded_i64(w, *x),
            (TypeTag::UInt64, Value::UInt64(x)) => codec::write_7bit_encoded_u64(w, *x),
            (TypeTag::Float, Value::Float(x)) => codec::write_f32(w, *x),
            (TypeTag::Double, Value::Double(x)) => codec::write_f64(w, *x),
            (TypeTag::String, Value::String(x)) => codec::write_string(w, x),
            (TypeTag::Custom(c), Value::Composite(parts)) if parts.len() == c.components.len() => {
                for (component, part) in c.components.iter().zip(parts) {
                    component.encode(part, w)?;
                }
            }
            (t, v) => return Err(format!("value {:?} does not match type {}", v, t.rust_type())),
        }
        Ok(())
    }

    /// Read one value of this type.
    pub fn decode(&self, r: &mut DataRowReader<'_>) -> Result<Value, DataRowError> {
        let v = match self {
            TypeTag::Bool => Value::Bool(r.read_bool()?),
            TypeTag::Byte => Value::Byte(r.read_u8()?),
            TypeTag::SByte => Value::SByte(r.read_i8()?),
            TypeTag::Int16 => Value::Int16(r.read_7bit_encoded_i16()?),
            TypeTag::UInt16 => Value::UInt16(r.read_7bit_encoded_u16()?),
            TypeTag::Int32 => Value::Int32(r.read_7bit_encoded_i32()?),
            TypeTag::UInt32 => Value::UInt32(r.read_7bit_encoded_u32()?),
            TypeTag::Int64 => Value::Int64(r.read_7bit_encoded_i64()?),
            TypeTag::UInt64 => Value::UInt64(r.read_7bit_encoded_u64()?),
            TypeTag::Float => Value::Float(r.read_f32()?),
            TypeTag::Double => Value::Double(r.read_f64()?),
            TypeTag::String => Value::String(r.read_string()?),
            TypeTag::Custom(c) => {
                let mut out = Vec::with_capacity(c.components.len());
                for component in &c.components {
                    out.push(component.decode(r)?);
                }
                Value::Composite(out)
            }
        };
        Ok(v)
    }
}

/// Registered custom types, resolved by name (case-insensitive).
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    custom: Vec<CustomType>,
}

impl Default for TypeRegistry {
    /// Registry with the composite types provided by [`crate::runtime`].
    fn default() -> Self {
        let f = || TypeTag::Float;
        let b = || TypeTag::Byte;
        TypeRegistry {
            custom: vec![
                CustomType::new("Vector2", vec![f(), f()]),
                CustomType::new("Vector3", vec![f(), f(), f()]),
                CustomType::new("Vector4", vec![f(), f(), f(), f()]),
                CustomType::new("Color", vec![f(), f(), f(), f()]),
                CustomType::new("Color32", vec![b(), b(), b(), b()]),
            ],
        }
    }
}

impl TypeRegistry {
    pub fn empty() -> Self {
        TypeRegistry { custom: Vec::new() }
    }

    /// Register a custom type. Components must be builtin scalars (no strings, no nesting),
    /// and the name must not shadow a builtin or an existing registration.
    pub fn register(&mut self, ty: CustomType) -> Result<(), String> {
        if ty.components.is_empty() {
            return Err(format!("custom type {} has no components", ty.name));
        }
        if let Some(bad) = ty
            .components
            .iter()
            .find(|c| matches!(c, TypeTag::String | TypeTag::Custom(_)))
        {
            return Err(format!(
                "custom type {}: component {} is not a scalar",
                ty.name,
                bad.rust_type()
            ));
        }
        if TypeTag::builtin(&ty.name).is_some() || self.find(&ty.name).is_some() {
            return Err(format!("type {} is already defined", ty.name));
        }
        self.custom.push(ty);
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&CustomType> {
        let name = name.trim();
        self.custom.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a type-row keyword to a builtin or registered custom type.
    pub fn resolve(&self, keyword: &str) -> Option<TypeTag> {
        TypeTag::builtin(keyword).or_else(|| self.find(keyword).cloned().map(TypeTag::Custom))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Id,
    Data,
}

/// One emitted (non-comment) column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub column: usize,
    pub name: String,
    pub role: FieldRole,
    pub type_tag: TypeTag,
    /// Rust type text of the generated property.
    pub keyword: String,
    pub comment: String,
}

impl FieldSchema {
    /// snake_case identifier of the generated property.
    pub fn ident(&self) -> String {
        rust_ident(&to_snake_case(&self.name))
    }
}

/// Ordered field list of a data table: Id and Data columns in ascending column index.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub column_count: usize,
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    pub fn id_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.role == FieldRole::Id)
    }

    pub fn data_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.role == FieldRole::Data)
    }

    /// Decode one record: every field in order.
    pub fn decode_row(&self, r: &mut DataRowReader<'_>) -> Result<Vec<Value>, DataRowError> {
        self.fields.iter().map(|f| f.type_tag.decode(r)).collect()
    }

    /// Parse one text row the way the generated text parser does.
    pub fn parse_text_row(&self, row: &str, trim_chars: &[char]) -> Result<Vec<Value>, DataRowError> {
        let mut fields = TextRowFields::new(row, trim_chars);
        let mut out = Vec::with_capacity(self.fields.len());
        for f in &self.fields {
            let text = fields.seek(f.column).next_str()?;
            let v = f
                .type_tag
                .parse_text(text)
                .map_err(|message| DataRowError::Conversion { field: f.column, message })?;
            out.push(v);
        }
        Ok(out)
    }

    /// Group Data columns with a trailing numeric suffix into property collections.
    pub fn property_collections(&self) -> Result<Vec<PropertyCollection>, String> {
        let mut collections: Vec<PropertyCollection> = Vec::new();
        for f in self.data_fields() {
            let Some((prefix, digits)) = split_numeric_suffix(&f.name) else {
                continue;
            };
            let key: i32 = digits
                .parse()
                .map_err(|_| format!("column {}: suffix '{}' does not fit in i32", f.name, digits))?;
            let item = PropertyItem {
                key,
                column: f.column,
                name: f.name.clone(),
            };
            match collections.iter_mut().find(|c| c.name == prefix) {
                Some(c) => c.items.push(item),
                None => collections.push(PropertyCollection {
                    name: prefix.to_string(),
                    type_tag: f.type_tag.clone(),
                    keyword: f.keyword.clone(),
                    items: vec![item],
                }),
            }
        }
        Ok(collections)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyItem {
    pub key: i32,
    pub column: usize,
    pub name: String,
}

/// Columns sharing a name prefix, distinguished by a trailing integer key.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCollection {
    pub name: String,
    pub type_tag: TypeTag,
    pub keyword: String,
    /// In column encounter order.
    pub items: Vec<PropertyItem>,
}

impl PropertyCollection {
    pub fn keys(&self) -> Vec<i32> {
        self.items.iter().map(|i| i.key).collect()
    }
}

/// Split `Reward12` into `("Reward", "12")`. Names without a trailing digit run, or made
/// only of digits, yield `None`.
pub fn split_numeric_suffix(name: &str) -> Option<(&str, &str)> {
    let m = TRAILING_DIGITS.find(name)?;
    if m.start() == 0 {
        return None;
    }
    Some((&name[..m.start()], m.as_str()))
}

/// `HPMax` -> `hp_max`, `GoodName2` -> `good_name2`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower);
                if boundary && !out.ends_with('_') {
                    out.push('_');
                }
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `hero_skill` -> `HeroSkill`. Already-PascalCase names are unchanged.
pub fn to_pascal_case(s: &str) -> String {
    s.split(['_', '-', ' '])
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut cs = p.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().chain(cs).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Identifiers that cannot be written even as raw identifiers.
pub const UNRAWABLE_IDENTS: &[&str] = &["self", "super", "crate", "Self"];

pub fn is_rust_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// Escape a keyword as a raw identifier.
pub fn rust_ident(ident: &str) -> String {
    if is_rust_keyword(ident) {
        format!("r#{}", ident)
    } else {
        ident.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(column: usize, name: &str, role: FieldRole, type_tag: TypeTag) -> FieldSchema {
        FieldSchema {
            column,
            name: name.to_string(),
            role,
            keyword: type_tag.rust_type().to_string(),
            type_tag,
            comment: String::new(),
        }
    }

    #[test]
    fn builtin_keywords_resolve_case_insensitively() {
        assert_eq!(TypeTag::builtin("int"), Some(TypeTag::Int32));
        assert_eq!(TypeTag::builtin("Int64"), Some(TypeTag::Int64));
        assert_eq!(TypeTag::builtin("STRING"), Some(TypeTag::String));
        assert_eq!(TypeTag::builtin("Vector3"), None);
    }

    #[test]
    fn registry_resolves_builtin_custom_types() {
        let reg = TypeRegistry::default();
        let t = reg.resolve("vector3").expect("vector3");
        assert!(!t.is_builtin());
        assert_eq!(t.rust_type(), "Vector3");
        assert_eq!(t.reader_call("ns"), "ns::read_vector3(reader)");
        assert_eq!(t.text_call("ns", 4), "fields.seek(4).next_with(ns::parse_vector3)");
        assert_eq!(TypeTag::Int64.text_call("ns", 0), "fields.seek(0).next::<i64>()");
        assert!(TypeRegistry::empty().resolve("Vector3").is_none());
    }

    #[test]
    fn registry_rejects_bad_registrations() {
        let mut reg = TypeRegistry::default();
        assert!(reg.register(CustomType::new("Vector3", vec![TypeTag::Float])).is_err());
        assert!(reg.register(CustomType::new("int", vec![TypeTag::Float])).is_err());
        assert!(reg.register(CustomType::new("Named", vec![TypeTag::String])).is_err());
        assert!(reg.register(CustomType::new("Empty", vec![])).is_err());
        assert!(reg.register(CustomType::new("Range", vec![TypeTag::Int32, TypeTag::Int32])).is_ok());
        assert_eq!(reg.resolve("range").map(|t| t.rust_type().to_string()), Some("Range".to_string()));
    }

    #[test]
    fn custom_values_encode_each_component() {
        let t = TypeRegistry::default().resolve("Color32").expect("color32");
        let v = t.parse_text("1,2,3,255").expect("parse");
        let mut w = Vec::new();
        t.encode(&v, &mut w).expect("encode");
        assert_eq!(w, vec![1, 2, 3, 255]);
        let mut r = DataRowReader::new(&w);
        assert_eq!(t.decode(&mut r).expect("decode"), v);
    }

    #[test]
    fn encode_rejects_mismatched_value() {
        let mut w = Vec::new();
        assert!(TypeTag::Int32.encode(&Value::String("x".into()), &mut w).is_err());
    }

    #[test]
    fn groups_follow_encounter_order() {
        let schema = TableSchema {
            column_count: 6,
            fields: vec![
                field(0, "Id", FieldRole::Id, TypeTag::Int32),
                field(1, "Reward1", FieldRole::Data, TypeTag::Int32),
                field(2, "Bonus1", FieldRole::Data, TypeTag::String),
                field(3, "Reward2", FieldRole::Data, TypeTag::Int32),
                field(4, "RewardAlpha", FieldRole::Data, TypeTag::Int32),
                field(5, "Name", FieldRole::Data, TypeTag::String),
            ],
        };
        let groups = schema.property_collections().expect("groups");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Reward");
        assert_eq!(groups[0].keys(), vec![1, 2]);
        assert_eq!(groups[1].name, "Bonus");
        assert_eq!(groups[1].keys(), vec![1]);
        assert_eq!(groups[1].type_tag, TypeTag::String);
        assert!(groups.iter().all(|g| g.items.iter().all(|i| i.name != "RewardAlpha")));
    }

    #[test]
    fn oversized_suffix_is_reported() {
        let schema = TableSchema {
            column_count: 1,
            fields: vec![field(0, "Slot99999999999", FieldRole::Data, TypeTag::Int32)],
        };
        assert!(schema.property_collections().is_err());
    }

    #[test]
    fn text_row_skips_comment_columns() {
        let schema = TableSchema {
            column_count: 4,
            fields: vec![
                field(1, "Id", FieldRole::Id, TypeTag::Int32),
                field(3, "Name", FieldRole::Data, TypeTag::String),
            ],
        };
        let values = schema.parse_text_row("note\t5\tskip\t\"Bob\"", &['"']).expect("parse");
        assert_eq!(values, vec![Value::Int32(5), Value::String("Bob".into())]);
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(to_snake_case("HPMax"), "hp_max");
        assert_eq!(to_snake_case("GoodName2"), "good_name2");
        assert_eq!(to_snake_case("DRHero"), "dr_hero");
        assert_eq!(to_snake_case("Level_Cap"), "level_cap");
        assert_eq!(to_pascal_case("hero_skill"), "HeroSkill");
        assert_eq!(to_pascal_case("Hero"), "Hero");
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("level"), "level");
        assert_eq!(split_numeric_suffix("Reward12"), Some(("Reward", "12")));
        assert_eq!(split_numeric_suffix("RewardAlpha"), None);
        assert_eq!(split_numeric_suffix("123"), None);
    }
}
