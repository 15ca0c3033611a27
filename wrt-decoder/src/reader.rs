// WRT - wrt-decoder
// Module: Binary Cursor
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Forward-only cursor over a WebAssembly binary.
//!
//! Every `read_*` method advances the cursor and fails with a parse error if
//! too few bytes remain. Errors carry the absolute offset at which the
//! failing item starts.

use alloc::vec::Vec;

use wrt_error::{codes, kinds, ErrorContext, Result};
use wrt_format::{leb128, types::Name};

/// Cursor over an immutable byte buffer
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos:   usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the first byte
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset from the start of the buffer
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Whether every byte has been consumed
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = *self.bytes.get(self.pos).ok_or(kinds::unexpected_end(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(kinds::unexpected_end(self.bytes.len()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read a fixed-width little-endian `u32`
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a fixed-width little-endian `u64`
    pub fn read_u64_le(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(word))
    }

    fn read_leb<T>(&mut self, read: impl FnOnce(&[u8]) -> Result<(T, usize)>) -> Result<T> {
        let start = self.pos;
        let (value, len) =
            read(&self.bytes[start..]).map_err(|e| e.with_context(ErrorContext::Offset(start)))?;
        self.pos += len;
        Ok(value)
    }

    /// Read an unsigned 32-bit LEB128 integer
    pub fn read_var_u32(&mut self) -> Result<u32> {
        self.read_leb(leb128::read_u32)
    }

    /// Read a signed 32-bit LEB128 integer
    pub fn read_var_i32(&mut self) -> Result<i32> {
        self.read_leb(leb128::read_i32)
    }

    /// Read a signed 64-bit LEB128 integer
    pub fn read_var_i64(&mut self) -> Result<i64> {
        self.read_leb(leb128::read_i64)
    }

    /// Read a signed 33-bit LEB128 integer, the encoding of block types
    pub fn read_var_s33(&mut self) -> Result<i64> {
        self.read_leb(|bytes| leb128::read_signed(bytes, 33))
    }

    /// Read a vector length followed by the raw bytes
    pub fn read_byte_vec(&mut self) -> Result<&'a [u8]> {
        let len = self.read_var_u32()?;
        self.read_bytes(len as usize)
    }

    /// Read a length-prefixed name. UTF-8 is not validated.
    pub fn read_name(&mut self) -> Result<Name> {
        Ok(Name::new(self.read_byte_vec()?.to_vec()))
    }

    /// Read a byte that must be zero
    pub fn read_zero_byte(&mut self) -> Result<()> {
        match self.read_byte()? {
            0 => Ok(()),
            value => Err(kinds::malformed_byte(
                codes::ZERO_BYTE_EXPECTED,
                "Zero byte expected",
                "reserved byte",
                value,
            )),
        }
    }

    /// Read a length-prefixed vector, decoding each element with `read_item`
    pub fn read_vec<T>(&mut self, mut read_item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_var_u32()? as usize;
        // Every element occupies at least one byte
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read_item(self)?);
        }
        Ok(items)
    }
}
