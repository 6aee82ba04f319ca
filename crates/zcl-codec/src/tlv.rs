//! Xiaomi-style tag/datatype value stream
//!
//! The "special" attributes (0xFF01, 0x00F7) pack their payload as a
//! sequence of `[tag_hi, datatype, value...]` entries inside a
//! length-prefixed blob. The datatype byte doubles as the low byte of
//! the 16-bit tag — tag and datatype are NOT independent fields,
//! which is why battery voltage is known as tag 0x0121 (tag byte
//! 0x01, uint16 type 0x21).

use crate::cursor::Cursor;
use crate::primitive::decode_value;
use crate::types::{Datatype, DecodeError, DecodedField};

/// Iterator over the TLV entries of a bounded region
///
/// Finite and not restartable. Stops silently on a truncated tail or
/// an unsupported datatype; fields already yielded stand.
pub struct TlvStream<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> TlvStream<'a> {
    /// Iterate the region covered by `cursor`
    #[must_use]
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

impl Iterator for TlvStream<'_> {
    type Item = DecodedField;

    fn next(&mut self) -> Option<DecodedField> {
        if self.done || self.cursor.remaining() < 2 {
            return None;
        }

        // Header never fails: 2 bytes were just checked
        let tag_hi = self.cursor.take_u8().ok()?;
        let type_code = self.cursor.take_u8().ok()?;
        let tag = u16::from(tag_hi) << 8 | u16::from(type_code);
        let datatype = Datatype::from_code(type_code);

        match decode_value(&mut self.cursor, datatype) {
            Ok(mut field) => {
                field.tag = Some(tag);
                Some(field)
            }
            Err(DecodeError::UnsupportedType(code)) => {
                tracing::warn!(tag, code, "unsupported datatype in TLV region, stopping");
                self.done = true;
                None
            }
            Err(DecodeError::OutOfRange { .. }) => {
                // Truncated tail: drop it, keep what was decoded
                self.done = true;
                None
            }
        }
    }
}
