//! Binary forms shared by the row encoder and the generated row decoder.
//!
//! - Integers of every width: 7-bit groups, least significant first, high bit set on every
//!   byte except the last. Signed values are written as their same-width two's complement
//!   bit pattern, so negative numbers take the maximum byte count.
//! - `f32` / `f64`: IEEE 754, little-endian, fixed width.
//! - `bool`, `u8`, `i8`: one byte.
//! - Strings: 7-bit encoded byte length, then UTF-8 bytes.
//!
//! [`DataRowReader`] is the decoding half and is what generated code calls into.

use crate::runtime::DataRowError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

pub fn write_7bit_encoded_u32(w: &mut Vec<u8>, mut v: u32) {
    while v >= 0x80 {
        w.push((v as u8) | 0x80);
        v >>= 7;
    }
    w.push(v as u8);
}

pub fn write_7bit_encoded_u64(w: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        w.push((v as u8) | 0x80);
        v >>= 7;
    }
    w.push(v as u8);
}

pub fn write_7bit_encoded_i32(w: &mut Vec<u8>, v: i32) {
    write_7bit_encoded_u32(w, v as u32);
}

pub fn write_7bit_encoded_i64(w: &mut Vec<u8>, v: i64) {
    write_7bit_encoded_u64(w, v as u64);
}

pub fn write_7bit_encoded_u16(w: &mut Vec<u8>, v: u16) {
    write_7bit_encoded_u32(w, v as u32);
}

pub fn write_7bit_encoded_i16(w: &mut Vec<u8>, v: i16) {
    write_7bit_encoded_u32(w, v as u16 as u32);
}

pub fn write_bool(w: &mut Vec<u8>, v: bool) {
    w.push(v as u8);
}

pub fn write_u8(w: &mut Vec<u8>, v: u8) {
    w.push(v);
}

pub fn write_i8(w: &mut Vec<u8>, v: i8) {
    w.push(v as u8);
}

pub fn write_f32(w: &mut Vec<u8>, v: f32) {
    w.extend_from_slice(&v.to_le_bytes());
}

pub fn write_f64(w: &mut Vec<u8>, v: f64) {
    w.extend_from_slice(&v.to_le_bytes());
}

pub fn write_string(w: &mut Vec<u8>, v: &str) {
    write_7bit_encoded_u32(w, v.len() as u32);
    w.extend_from_slice(v.as_bytes());
}

/// Sequential reader over concatenated row records.
///
/// Records carry no delimiters, so a caller must read exactly the field sequence the
/// table declares, row after row, until [`DataRowReader::is_at_end`].
#[derive(Debug)]
pub struct DataRowReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> DataRowReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        DataRowReader {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn is_at_end(&self) -> bool {
        self.position() >= self.cursor.get_ref().len()
    }

    pub fn read_bool(&mut self) -> Result<bool, DataRowError> {
        Ok(self.cursor.read_u8()? != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8, DataRowError> {
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8, DataRowError> {
        Ok(self.cursor.read_i8()?)
    }

    pub fn read_7bit_encoded_u32(&mut self) -> Result<u32, DataRowError> {
        let mut result = 0u32;
        for shift in (0..35).step_by(7) {
            let byte = self.cursor.read_u8()?;
            if shift == 28 && byte > 0x0f {
                return Err(self.malformed("7-bit encoded integer overflows 32 bits"));
            }
            result |= ((byte & 0x7f) as u32) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(self.malformed("too many bytes in a 7-bit encoded 32-bit integer"))
    }

    pub fn read_7bit_encoded_u64(&mut self) -> Result<u64, DataRowError> {
        let mut result = 0u64;
        for shift in (0..70).step_by(7) {
            let byte = self.cursor.read_u8()?;
            if shift == 63 && byte > 0x01 {
                return Err(self.malformed("7-bit encoded integer overflows 64 bits"));
            }
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(self.malformed("too many bytes in a 7-bit encoded 64-bit integer"))
    }

    pub fn read_7bit_encoded_i32(&mut self) -> Result<i32, DataRowError> {
        Ok(self.read_7bit_encoded_u32()? as i32)
    }

    pub fn read_7bit_encoded_i64(&mut self) -> Result<i64, DataRowError> {
        Ok(self.read_7bit_encoded_u64()? as i64)
    }

    pub fn read_7bit_encoded_u16(&mut self) -> Result<u16, DataRowError> {
        let v = self.read_7bit_encoded_u32()?;
        u16::try_from(v).map_err(|_| self.malformed("7-bit encoded integer overflows 16 bits"))
    }

    pub fn read_7bit_encoded_i16(&mut self) -> Result<i16, DataRowError> {
        Ok(self.read_7bit_encoded_u16()? as i16)
    }

    pub fn read_f32(&mut self) -> Result<f32, DataRowError> {
        Ok(self.cursor.read_f32::<LittleEndian>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64, DataRowError> {
        Ok(self.cursor.read_f64::<LittleEndian>()?)
    }

    pub fn read_string(&mut self) -> Result<String, DataRowError> {
        let len = self.read_7bit_encoded_u32()? as usize;
        let remaining = self.cursor.get_ref().len().saturating_sub(self.position());
        if len > remaining {
            return Err(self.malformed("string length exceeds remaining bytes"));
        }
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|_| self.malformed("string is not valid UTF-8"))
    }

    fn malformed(&self, what: &str) -> DataRowError {
        DataRowError::Malformed(format!("{} at byte {}", what, self.position()))
    }
}
