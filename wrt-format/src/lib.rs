// WRT - wrt-format
// Module: WebAssembly Binary Format Definitions
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! WebAssembly format handling for WRT
//!
//! This crate defines the WebAssembly binary format constants, the LEB128
//! variable-length integer codec and the in-memory module representation
//! produced by `wrt-decoder` and consumed by `wrt-runtime`.
//!
//! The module data model is immutable once decoded. Instructions form a tree:
//! `block`, `loop` and `if` own their nested instruction sequences instead of
//! referring to jump targets in a flat stream.
//!
//! It is designed to work in both std and no_std environments when configured
//! with the appropriate feature flags.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

extern crate alloc;

/// WebAssembly binary constants (magic, section ids, type bytes, opcodes)
#[allow(missing_docs)] // Opcode and section id names are self-describing
pub mod binary;
/// Instruction tree types
pub mod instructions;
/// LEB128 variable-length integer codec
pub mod leb128;
/// Decoded module representation
pub mod module;
/// Core WebAssembly types
pub mod types;

pub use instructions::{Args, BlockArgs, BrTableArgs, Expr, IfArgs, Instruction, MemArg};
pub use module::{
    Code, CustomSection, Data, Element, Export, ExportDesc, Global, Import, ImportDesc, Locals,
    Module,
};
pub use types::{
    BlockType, FuncType, GlobalType, Limits, MemoryType, Name, RefType, TableType, ValueType,
};
