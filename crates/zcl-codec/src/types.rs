//! Common types used throughout the codec

use thiserror::Error;

/// Decode errors
///
/// Both variants are local to the region being decoded: callers keep
/// whatever fields were fully decoded before the error and never
/// abort sibling regions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Read of {needed} bytes exceeds remaining {remaining}")]
    OutOfRange { needed: usize, remaining: usize },

    #[error("Unsupported ZCL datatype: {0:#04X}")]
    UnsupportedType(u8),
}

/// ZCL primitive datatypes understood by the decoder
///
/// Codes follow the ZCL specification. Anything else is carried as
/// `Unsupported` so a TLV stream can stop cleanly instead of
/// misinterpreting the bytes that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    Bool,
    Uint8,
    Uint16,
    Uint24,
    Uint32,
    Uint40,
    Uint48,
    Uint64,
    Int8,
    Int16,
    Int32,
    Float32,
    OctetString,
    CharString,
    Unsupported(u8),
}

impl Datatype {
    /// Map a ZCL datatype code to a variant
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0x10 => Datatype::Bool,
            0x20 => Datatype::Uint8,
            0x21 => Datatype::Uint16,
            0x22 => Datatype::Uint24,
            0x23 => Datatype::Uint32,
            0x24 => Datatype::Uint40,
            0x25 => Datatype::Uint48,
            0x27 => Datatype::Uint64,
            0x28 => Datatype::Int8,
            0x29 => Datatype::Int16,
            0x2B => Datatype::Int32,
            0x39 => Datatype::Float32,
            0x41 => Datatype::OctetString,
            0x42 => Datatype::CharString,
            other => Datatype::Unsupported(other),
        }
    }

    /// The raw ZCL code for this datatype
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Datatype::Bool => 0x10,
            Datatype::Uint8 => 0x20,
            Datatype::Uint16 => 0x21,
            Datatype::Uint24 => 0x22,
            Datatype::Uint32 => 0x23,
            Datatype::Uint40 => 0x24,
            Datatype::Uint48 => 0x25,
            Datatype::Uint64 => 0x27,
            Datatype::Int8 => 0x28,
            Datatype::Int16 => 0x29,
            Datatype::Int32 => 0x2B,
            Datatype::Float32 => 0x39,
            Datatype::OctetString => 0x41,
            Datatype::CharString => 0x42,
            Datatype::Unsupported(code) => *code,
        }
    }

    /// Fixed value width in bytes, or `None` for length-prefixed and
    /// unsupported types
    #[must_use]
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Datatype::Bool | Datatype::Uint8 | Datatype::Int8 => Some(1),
            Datatype::Uint16 | Datatype::Int16 => Some(2),
            Datatype::Uint24 => Some(3),
            Datatype::Uint32 | Datatype::Int32 | Datatype::Float32 => Some(4),
            Datatype::Uint40 => Some(5),
            Datatype::Uint48 => Some(6),
            Datatype::Uint64 => Some(8),
            Datatype::OctetString | Datatype::CharString | Datatype::Unsupported(_) => None,
        }
    }
}

/// A decoded primitive value
///
/// Wide unsigned integers (40/48/64 bit) are consumed for cursor
/// advancement but kept as opaque bytes; no shipped transform does
/// arithmetic beyond 32-bit magnitudes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Float(f32),
    Bytes(Vec<u8>),
    Text(String),
}

impl FieldValue {
    /// Numeric view as i64, if this value is numeric
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Unsigned(v) => i64::try_from(*v).ok(),
            FieldValue::Signed(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view as f64, if this value is numeric
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Unsigned(v) => Some(*v as f64),
            FieldValue::Signed(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }
}

/// Result of one decode step
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    /// TLV tag, where the enclosing format carries one
    pub tag: Option<u16>,
    pub datatype: Datatype,
    pub value: FieldValue,
    /// Bytes consumed for the value (excluding tag/type header)
    pub width: usize,
}
