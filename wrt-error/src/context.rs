// WRT - wrt-error
// Module: WRT Error Context
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

use core::fmt;

/// Detail that localises an error within its input.
///
/// All variants are `Copy` so that [`crate::Error`] stays `Copy` and can be
/// built in `const` contexts without allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    /// A byte outside a closed encoding.
    Byte {
        /// Name of the field being decoded
        field: &'static str,
        /// The offending byte
        value: u8,
    },
    /// A signed value outside a closed encoding (block types).
    Value {
        /// Name of the field being decoded
        field: &'static str,
        /// The offending value
        value: i64,
    },
    /// A section, identified by id.
    Section {
        /// Section id
        id: u8,
    },
    /// A section whose declared size was not consumed exactly.
    SectionSize {
        /// Section id
        id: u8,
        /// Size declared in the section header
        declared: u32,
        /// Bytes actually consumed by the section reader
        consumed: usize,
    },
    /// A position in the input buffer.
    Offset(usize),
    /// An index into one of the index spaces.
    Index {
        /// Name of the index space
        space: &'static str,
        /// The offending index
        index: u32,
    },
    /// An effective address in linear memory or a table.
    Address {
        /// First byte or slot of the access
        address: u64,
        /// Number of bytes or slots accessed
        len: u64,
    },
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte { field, value } => write!(f, "{field}: 0x{value:02x}"),
            Self::Value { field, value } => write!(f, "{field}: {value}"),
            Self::Section { id } => write!(f, "section id {id}"),
            Self::SectionSize { id, declared, consumed } => write!(
                f,
                "section id {id}: declared {declared} bytes, consumed {consumed}"
            ),
            Self::Offset(offset) => write!(f, "at offset 0x{offset:x}"),
            Self::Index { space, index } => write!(f, "{space} index {index}"),
            Self::Address { address, len } => write!(f, "address 0x{address:x} (+{len})"),
        }
    }
}
