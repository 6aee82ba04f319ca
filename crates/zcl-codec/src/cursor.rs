//! Bounds-checked forward reader over a report payload
//!
//! The original plugin scripts index `ZclFrame.at(i)` freely and rely
//! on silent `undefined` propagation past the end of the buffer. Here
//! every read is checked against an explicit limit and fails with
//! `DecodeError::OutOfRange` instead.

use crate::types::DecodeError;

/// A forward-only cursor over an immutable byte buffer
///
/// Invariant: `0 <= offset <= limit <= data.len()`. A failed read
/// never advances the offset (no partial consumption).
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over the whole buffer
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            limit: data.len(),
        }
    }

    /// Bytes left before the limit
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.offset
    }

    /// Current offset from the start of the underlying buffer
    #[must_use]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Look at the next `n` bytes without advancing
    pub fn peek(&self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::OutOfRange {
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(&self.data[self.offset..self.offset + n])
    }

    /// Read the next `n` bytes, advancing the offset by exactly `n`
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let bytes = self.peek(n)?;
        self.offset += n;
        Ok(bytes)
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }

    /// Read one byte
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian u16
    pub fn take_u16_le(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a little-endian u24 into a u32
    pub fn take_u24_le(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(3)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }

    /// Read a little-endian u32
    pub fn take_u32_le(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Carve a bounded child cursor for a declared-length region
    ///
    /// The declared length comes from the device and is not trusted:
    /// it is clamped against this cursor's remaining bytes. The parent
    /// advances past the whole region either way.
    pub fn sub_limit(&mut self, declared_len: usize) -> Result<Cursor<'a>, DecodeError> {
        let len = declared_len.min(self.remaining());
        let child = Cursor {
            data: self.data,
            offset: self.offset,
            limit: self.offset + len,
        };
        self.offset += len;
        Ok(child)
    }
}
