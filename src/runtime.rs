//! Support items for generated data-row code.
//!
//! Generated row types import this module (the default target namespace is
//! `tablegen::runtime`). Text cells are converted through [`FromCell`]; binary rows are
//! read with [`DataRowReader`]. The encoder converts cells with the very same
//! [`FromCell`] impls, so text and binary parsing cannot disagree on what a cell means.

pub use crate::codec::DataRowReader;

/// Errors raised by generated row types at consumption time.
#[derive(Debug, thiserror::Error)]
pub enum DataRowError {
    /// No item in a property collection has the requested key.
    #[error("{accessor} with invalid id '{key}'")]
    Lookup { accessor: &'static str, key: i32 },
    /// Index outside `[0, count)` of a property collection.
    #[error("{accessor} with invalid index '{index}'")]
    Range { accessor: &'static str, index: usize },
    #[error("Conversion: field {field}: {message}")]
    Conversion { field: usize, message: String },
    #[error("Malformed: {0}")]
    Malformed(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Conversion from the text form of a cell.
pub trait FromCell: Sized {
    fn from_cell(text: &str) -> Result<Self, String>;
}

macro_rules! from_cell_via_parse {
    ($($t:ty),*) => {
        $(
            impl FromCell for $t {
                fn from_cell(text: &str) -> Result<Self, String> {
                    text.trim()
                        .parse::<$t>()
                        .map_err(|e| format!("'{}' is not a valid {}: {}", text, stringify!($t), e))
                }
            }
        )*
    };
}

from_cell_via_parse!(u8, i8, i16, u16, i32, u32, i64, u64, f32, f64);

impl FromCell for bool {
    fn from_cell(text: &str) -> Result<Self, String> {
        let t = text.trim();
        if t.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if t.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(format!("'{}' is not a valid bool", text))
        }
    }
}

impl FromCell for String {
    fn from_cell(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }
}

/// Separator between the components of a composite cell such as `1,2,3`.
pub const COMPONENT_SEPARATOR: char = ',';

/// Split a composite cell into exactly `expected` components.
pub fn split_components<'a>(text: &'a str, type_name: &str, expected: usize) -> Result<Vec<&'a str>, String> {
    let parts: Vec<&str> = text.split(COMPONENT_SEPARATOR).map(str::trim).collect();
    if parts.len() != expected {
        return Err(format!(
            "'{}' is not a valid {}: expected {} components, found {}",
            text,
            type_name,
            expected,
            parts.len()
        ));
    }
    Ok(parts)
}

/// Field cursor over one text row: split on tab, wrapping characters trimmed.
#[derive(Debug)]
pub struct TextRowFields<'a> {
    fields: Vec<&'a str>,
    index: usize,
}

impl<'a> TextRowFields<'a> {
    pub fn new(data_row_string: &'a str, trim_chars: &[char]) -> Self {
        TextRowFields {
            fields: data_row_string
                .split('\t')
                .map(|c| c.trim_matches(|ch| trim_chars.contains(&ch)))
                .collect(),
            index: 0,
        }
    }

    /// Position on raw column `column`; the next read starts there.
    pub fn seek(&mut self, column: usize) -> &mut Self {
        self.index = column;
        self
    }

    pub fn next_str(&mut self) -> Result<&'a str, DataRowError> {
        let field = self.fields.get(self.index).copied().ok_or_else(|| {
            DataRowError::Malformed(format!("row has {} fields, expected more", self.fields.len()))
        })?;
        self.index += 1;
        Ok(field)
    }

    pub fn next<T: FromCell>(&mut self) -> Result<T, DataRowError> {
        let field = self.index;
        let text = self.next_str()?;
        T::from_cell(text).map_err(|message| DataRowError::Conversion { field, message })
    }

    /// Convert the next field with a custom parse function.
    pub fn next_with<T>(
        &mut self,
        parse: impl FnOnce(&str) -> Result<T, DataRowError>,
    ) -> Result<T, DataRowError> {
        let field = self.index;
        let text = self.next_str()?;
        parse(text).map_err(|e| match e {
            DataRowError::Conversion { message, .. } => DataRowError::Conversion { field, message },
            other => other,
        })
    }
}

/// Declares a composite built-in custom type with its `FromCell`, `parse_*` and `read_*` items.
macro_rules! composite_type {
    ($name:ident, $parse:ident, $read:ident, $elem:ty, $read_elem:ident, [$($field:ident),+]) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq)]
        pub struct $name {
            $(pub $field: $elem,)+
        }

        impl FromCell for $name {
            fn from_cell(text: &str) -> Result<Self, String> {
                let names = [$(stringify!($field)),+];
                let parts = split_components(text, stringify!($name), names.len())?;
                let mut it = parts.into_iter();
                Ok($name {
                    $($field: <$elem>::from_cell(it.next().unwrap_or_default())?,)+
                })
            }
        }

        pub fn $parse(text: &str) -> Result<$name, DataRowError> {
            $name::from_cell(text).map_err(|message| DataRowError::Conversion { field: 0, message })
        }

        pub fn $read(reader: &mut DataRowReader<'_>) -> Result<$name, DataRowError> {
            Ok($name {
                $($field: reader.$read_elem()?,)+
            })
        }
    };
}

composite_type!(Vector2, parse_vector2, read_vector2, f32, read_f32, [x, y]);
composite_type!(Vector3, parse_vector3, read_vector3, f32, read_f32, [x, y, z]);
composite_type!(Vector4, parse_vector4, read_vector4, f32, read_f32, [x, y, z, w]);
composite_type!(Color, parse_color, read_color, f32, read_f32, [r, g, b, a]);
composite_type!(Color32, parse_color32, read_color32, u8, read_u8, [r, g, b, a]);

/// Read every record in `bytes` with `read_row`, which must consume exactly one record.
pub fn read_rows<T>(
    bytes: &[u8],
    mut read_row: impl FnMut(&mut DataRowReader<'_>) -> Result<T, DataRowError>,
) -> Result<Vec<T>, DataRowError> {
    let mut reader = DataRowReader::new(bytes);
    let mut rows = Vec::new();
    while !reader.is_at_end() {
        rows.push(read_row(&mut reader)?);
    }
    Ok(rows)
}
