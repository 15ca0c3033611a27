// WRT - wrt-decoder
// Module: WebAssembly Binary Decoder
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! WebAssembly module decoder for wrt runtime
//!
//! This crate turns a WebAssembly binary into the [`Module`] data model of
//! `wrt-format`, validating the structure of the binary as it goes:
//!
//! - magic number and version
//! - strictly increasing section ids, custom sections allowed anywhere
//! - exact accounting of every declared section and code body size
//! - closed enumerations for value types, block types, mutability flags,
//!   element types and import/export descriptors
//! - properly terminated expressions and zero reserved bytes
//!
//! Decoding fails fast and fails whole: the first violation aborts decoding
//! and no partially decoded module is returned.
//!
//! ```
//! let bytes = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
//! let module = wrt_decoder::decode_module(&bytes).unwrap();
//! assert!(module.types.is_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Instruction tree decoding
pub mod instructions;
/// Forward-only binary cursor
pub mod reader;
/// Section payload readers
pub mod sections;

use tracing::{debug, debug_span, trace};
use wrt_error::{codes, kinds, Error, ErrorContext, Result};
use wrt_format::{
    binary,
    module::{CustomSection, Module},
};

use crate::reader::Reader;

/// Decode a WebAssembly binary module.
///
/// # Errors
///
/// Returns a parse error describing the first violation of the binary format.
pub fn decode_module(bytes: &[u8]) -> Result<Module> {
    let _span = debug_span!("decode_module", len = bytes.len()).entered();

    let mut reader = Reader::new(bytes);
    let mut module = Module::new();

    module.magic = reader.read_u32_le()?;
    if module.magic != u32::from_le_bytes(binary::WASM_MAGIC) {
        return Err(Error::parse_error(codes::INVALID_MAGIC, "Invalid magic number")
            .with_context(ErrorContext::Offset(0)));
    }
    module.version = reader.read_u32_le()?;
    if module.version != u32::from_le_bytes(binary::WASM_VERSION) {
        return Err(Error::parse_error(codes::INVALID_VERSION, "Unsupported version")
            .with_context(ErrorContext::Offset(4)));
    }

    let mut last_id = binary::CUSTOM_SECTION_ID;
    while !reader.is_empty() {
        let id = reader.read_byte()?;
        let size = reader.read_var_u32()?;
        trace!(id, size, offset = reader.position(), "section");

        if id == binary::CUSTOM_SECTION_ID {
            module.customs.push(read_custom_section(reader.read_bytes(size as usize)?)?);
            continue;
        }
        if id > binary::DATA_SECTION_ID || id <= last_id {
            return Err(kinds::malformed_section_id(id));
        }
        last_id = id;

        let start = reader.position();
        sections::read_section(&mut reader, id, &mut module)?;
        let consumed = reader.position() - start;
        if consumed != size as usize {
            return Err(kinds::section_size_mismatch(id, size, consumed));
        }
    }

    if module.functions.len() != module.code.len() {
        return Err(Error::parse_error(
            codes::FUNCTION_CODE_MISMATCH,
            "Function and code section have inconsistent lengths",
        ));
    }

    debug!(
        types = module.types.len(),
        imports = module.imports.len(),
        functions = module.functions.len(),
        exports = module.exports.len(),
        "decoded module"
    );
    Ok(module)
}

fn read_custom_section(payload: &[u8]) -> Result<CustomSection> {
    let mut reader = Reader::new(payload);
    let name = reader.read_name()?;
    let data = reader.read_bytes(reader.remaining())?.to_vec();
    Ok(CustomSection { name, data })
}

pub use instructions::Terminator;
