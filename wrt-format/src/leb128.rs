// WRT - wrt-format
// Module: LEB128 Codec
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Little-endian base-128 variable-length integers.
//!
//! Every byte contributes its low seven bits; a set high bit means another
//! byte follows. Readers return the decoded value together with the number of
//! bytes consumed and never read past the end of the slice.

use alloc::vec::Vec;

use wrt_error::{codes, kinds, Error, Result};

const LEB128_TOO_LONG: Error =
    Error::parse_error(codes::LEB128_TOO_LONG, "LEB128 integer too long");
const LEB128_OVERFLOW: Error =
    Error::parse_error(codes::LEB128_OVERFLOW, "LEB128 integer too large");

/// Maximum encoded length in bytes for an integer of `bits` bits.
const fn max_len(bits: u32) -> usize {
    bits.div_ceil(7) as usize
}

/// Decode an unsigned LEB128 integer of at most `bits` bits.
///
/// # Arguments
///
/// * `bytes` - Input starting at the first byte of the integer
/// * `bits` - Bit width of the target type, between 1 and 64
///
/// # Returns
///
/// The decoded value and the number of bytes consumed.
///
/// # Errors
///
/// * `UNEXPECTED_END` if the slice ends before the terminating byte
/// * `LEB128_TOO_LONG` if the encoding exceeds `ceil(bits / 7)` bytes
/// * `LEB128_OVERFLOW` if the final byte sets bits beyond `bits`
pub fn read_unsigned(bytes: &[u8], bits: u32) -> Result<(u64, usize)> {
    let max_len = max_len(bits);
    let mut result = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= max_len {
            return Err(LEB128_TOO_LONG);
        }
        let low = u64::from(byte & 0x7F);
        if i + 1 == max_len {
            let remaining = bits - shift;
            if remaining < 7 && low >> remaining != 0 {
                return Err(LEB128_OVERFLOW);
            }
        }
        result |= low << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(kinds::unexpected_end(bytes.len()))
}

/// Decode a signed LEB128 integer of at most `bits` bits.
///
/// If bit 6 of the terminating byte is set the result is sign-extended, so
/// the single byte `0x7F` decodes to `-1`.
///
/// # Errors
///
/// Same conditions as [`read_unsigned`]; for the final byte of a maximal
/// encoding the unused high bits must replicate the sign bit.
pub fn read_signed(bytes: &[u8], bits: u32) -> Result<(i64, usize)> {
    let max_len = max_len(bits);
    let mut result = 0i64;
    let mut shift = 0u32;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= max_len {
            return Err(LEB128_TOO_LONG);
        }
        let low = i64::from(byte & 0x7F);
        if i + 1 == max_len {
            let remaining = bits - shift;
            if remaining < 7 {
                let sign_and_unused = low >> (remaining - 1);
                let all_ones = (1i64 << (8 - remaining)) - 1;
                if sign_and_unused != 0 && sign_and_unused != all_ones {
                    return Err(LEB128_OVERFLOW);
                }
            }
        }
        result |= low << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            if shift < 64 && byte & 0x40 != 0 {
                result |= -1i64 << shift;
            }
            return Ok((result, i + 1));
        }
    }

    Err(kinds::unexpected_end(bytes.len()))
}

/// Decode an unsigned 32-bit LEB128 integer.
pub fn read_u32(bytes: &[u8]) -> Result<(u32, usize)> {
    let (value, len) = read_unsigned(bytes, 32)?;
    let value = u32::try_from(value).map_err(|_| LEB128_OVERFLOW)?;
    Ok((value, len))
}

/// Decode a signed 32-bit LEB128 integer.
pub fn read_i32(bytes: &[u8]) -> Result<(i32, usize)> {
    let (value, len) = read_signed(bytes, 32)?;
    let value = i32::try_from(value).map_err(|_| LEB128_OVERFLOW)?;
    Ok((value, len))
}

/// Decode a signed 64-bit LEB128 integer.
pub fn read_i64(bytes: &[u8]) -> Result<(i64, usize)> {
    read_signed(bytes, 64)
}

/// Encode an unsigned 32-bit integer.
#[must_use]
pub fn write_u32(value: u32) -> Vec<u8> {
    write_u64(u64::from(value))
}

/// Encode an unsigned 64-bit integer.
#[must_use]
pub fn write_u64(value: u64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut value = value;

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        result.push(byte);
        if value == 0 {
            return result;
        }
    }
}

/// Encode a signed 32-bit integer.
#[must_use]
pub fn write_i32(value: i32) -> Vec<u8> {
    write_i64(i64::from(value))
}

/// Encode a signed 64-bit integer.
#[must_use]
pub fn write_i64(value: i64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut value = value;

    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        // Done once the remaining bits are pure sign extension of bit 6
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            result.push(byte);
            return result;
        }
        result.push(byte | 0x80);
    }
}
