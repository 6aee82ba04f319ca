//! ZCL primitive value decoding
//!
//! One function, `decode_value`, reads a single value of a declared
//! datatype from a cursor. Integers are little-endian per ZCL wire
//! order; signed types are sign-extended into an i64.

use crate::cursor::Cursor;
use crate::types::{Datatype, DecodeError, DecodedField, FieldValue};

/// Decode one primitive value of the given datatype
///
/// Wide unsigned integers (40/48/64 bit) are consumed but returned as
/// opaque bytes rather than interpreted; the original engine skips
/// them the same way because its arithmetic is 32-bit bounded.
pub fn decode_value(cursor: &mut Cursor<'_>, datatype: Datatype) -> Result<DecodedField, DecodeError> {
    let value = match datatype {
        Datatype::Bool | Datatype::Uint8 => FieldValue::Unsigned(u64::from(cursor.take_u8()?)),
        Datatype::Uint16 => FieldValue::Unsigned(u64::from(cursor.take_u16_le()?)),
        Datatype::Uint24 => FieldValue::Unsigned(u64::from(cursor.take_u24_le()?)),
        Datatype::Uint32 => FieldValue::Unsigned(u64::from(cursor.take_u32_le()?)),
        Datatype::Int8 => FieldValue::Signed(i64::from(cursor.take_u8()? as i8)),
        Datatype::Int16 => FieldValue::Signed(i64::from(cursor.take_u16_le()? as i16)),
        Datatype::Int32 => FieldValue::Signed(i64::from(cursor.take_u32_le()? as i32)),
        Datatype::Uint40 | Datatype::Uint48 | Datatype::Uint64 => {
            // fixed_width is Some for all three
            let width = datatype.fixed_width().unwrap_or(0);
            FieldValue::Bytes(cursor.take(width)?.to_vec())
        }
        Datatype::Float32 => {
            let b = cursor.take(4)?;
            FieldValue::Float(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        }
        Datatype::OctetString => {
            let len = usize::from(cursor.take_u8()?);
            FieldValue::Bytes(cursor.take(len)?.to_vec())
        }
        Datatype::CharString => {
            let len = usize::from(cursor.take_u8()?);
            let bytes = cursor.take(len)?;
            FieldValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
        Datatype::Unsupported(code) => return Err(DecodeError::UnsupportedType(code)),
    };

    // For strings: length byte plus payload
    let width = match (&value, datatype) {
        (FieldValue::Text(s), Datatype::CharString) => 1 + s.len(),
        (FieldValue::Bytes(b), Datatype::OctetString) => 1 + b.len(),
        _ => datatype.fixed_width().unwrap_or(0),
    };

    Ok(DecodedField {
        tag: None,
        datatype,
        value,
        width,
    })
}
