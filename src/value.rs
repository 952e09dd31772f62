//! Typed cell values (text-parsed or binary-decoded).

use std::fmt;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    /// Components of a custom type, in declaration order.
    Composite(Vec<Value>),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(x) => Some(*x as i64),
            Value::SByte(x) => Some(*x as i64),
            Value::Int16(x) => Some(*x as i64),
            Value::UInt16(x) => Some(*x as i64),
            Value::Int32(x) => Some(*x as i64),
            Value::UInt32(x) => Some(*x as i64),
            Value::Int64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&[Value]> {
        match self {
            Value::Composite(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(x) => write!(f, "{}", x),
            Value::Byte(x) => write!(f, "{}", x),
            Value::SByte(x) => write!(f, "{}", x),
            Value::Int16(x) => write!(f, "{}", x),
            Value::UInt16(x) => write!(f, "{}", x),
            Value::Int32(x) => write!(f, "{}", x),
            Value::UInt32(x) => write!(f, "{}", x),
            Value::Int64(x) => write!(f, "{}", x),
            Value::UInt64(x) => write!(f, "{}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Composite(parts) => {
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
        }
    }
}
