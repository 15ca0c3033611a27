// WRT - wrt-error
// Module: WRT Error Kinds
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Constructors for errors raised from many call sites.

use crate::{codes, Error, ErrorContext};

/// Input ended while `offset` bytes had been consumed.
#[must_use]
pub const fn unexpected_end(offset: usize) -> Error {
    Error::UNEXPECTED_END.with_context(ErrorContext::Offset(offset))
}

/// A byte outside a closed encoding was found while decoding `field`.
#[must_use]
pub const fn malformed_byte(code: u16, message: &'static str, field: &'static str, value: u8) -> Error {
    Error::parse_error(code, message).with_context(ErrorContext::Byte { field, value })
}

/// A section id arrived out of order or is unknown.
#[must_use]
pub const fn malformed_section_id(id: u8) -> Error {
    Error::parse_error(codes::MALFORMED_SECTION_ID, "Malformed section id")
        .with_context(ErrorContext::Section { id })
}

/// A section reader did not consume exactly its declared size.
#[must_use]
pub const fn section_size_mismatch(id: u8, declared: u32, consumed: usize) -> Error {
    Error::parse_error(codes::SECTION_SIZE_MISMATCH, "Section size mismatch")
        .with_context(ErrorContext::SectionSize { id, declared, consumed })
}

/// Linear memory access of `len` bytes at `address` out of bounds.
#[must_use]
pub const fn memory_out_of_bounds(address: u64, len: u64) -> Error {
    Error::runtime_trap(codes::MEMORY_OUT_OF_BOUNDS, "Out of bounds memory access")
        .with_context(ErrorContext::Address { address, len })
}

/// Table access at `index` out of bounds.
#[must_use]
pub const fn table_out_of_bounds(index: u32) -> Error {
    Error::runtime_trap(codes::TABLE_OUT_OF_BOUNDS, "Out of bounds table access")
        .with_context(ErrorContext::Index { space: "table element", index })
}

/// An index outside its index space.
#[must_use]
pub const fn invalid_index(code: u16, message: &'static str, space: &'static str, index: u32) -> Error {
    Error::runtime_trap(code, message).with_context(ErrorContext::Index { space, index })
}

/// Export `name` missing or not of the requested kind.
#[must_use]
pub const fn export_not_found() -> Error {
    Error::runtime_error(codes::EXPORT_NOT_FOUND, "Export not found")
}

/// Arguments do not match the callee's signature.
#[must_use]
pub const fn invalid_arguments() -> Error {
    Error::runtime_error(codes::INVALID_ARGUMENTS, "Arguments do not match function type")
}
