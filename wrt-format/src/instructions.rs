// WRT - wrt-format
// Module: Instruction Tree
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Decoded instructions.
//!
//! An [`Instruction`] is an opcode plus an [`Args`] payload whose shape is
//! determined by the opcode. Structured control instructions own their
//! nested bodies, so a function body is a tree rather than a flat stream.

use alloc::vec::Vec;

use crate::types::BlockType;

/// A sequence of instructions, as found in function bodies and initializer
/// expressions. The terminating `end` is not stored.
pub type Expr = Vec<Instruction>;

/// Alignment hint and static offset of a load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemArg {
    /// Alignment exponent (log2 of the byte alignment)
    pub align:  u32,
    /// Unsigned byte offset added to the dynamic address
    pub offset: u32,
}

/// Payload of `block` and `loop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockArgs {
    /// Block signature
    pub block_type: BlockType,
    /// Nested body
    pub body:       Expr,
}

/// Payload of `if`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfArgs {
    /// Block signature shared by both arms
    pub block_type: BlockType,
    /// Instructions executed when the condition is non-zero
    pub then_body:  Expr,
    /// Instructions executed otherwise; `None` when no `else` was present
    pub else_body:  Option<Expr>,
}

/// Payload of `br_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrTableArgs {
    /// Label depths selected by in-range operands
    pub labels:  Vec<u32>,
    /// Label depth used for any out-of-range operand
    pub default: u32,
}

impl BrTableArgs {
    /// Label depth for a selector operand.
    ///
    /// Out-of-range selectors pick the default label; this is never an error.
    #[must_use]
    pub fn target(&self, selector: u32) -> u32 {
        self.labels.get(selector as usize).copied().unwrap_or(self.default)
    }
}

/// Opcode-dependent argument payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    /// No immediate arguments
    None,
    /// A label, local, global or function index
    Index(u32),
    /// `i32.const` value
    I32(i32),
    /// `i64.const` value
    I64(i64),
    /// `f32.const` value as raw bits
    F32(u32),
    /// `f64.const` value as raw bits
    F64(u64),
    /// Load or store memory argument
    Memory(MemArg),
    /// `block` or `loop` payload
    Block(BlockArgs),
    /// `if` payload
    If(IfArgs),
    /// `br_table` payload
    BrTable(BrTableArgs),
    /// Expected type index of `call_indirect`
    CallIndirect(u32),
    /// Sub-opcode of the `0xFC` saturating truncation family
    Saturating(u8),
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Opcode byte
    pub opcode: u8,
    /// Immediate arguments
    pub args:   Args,
}

impl Instruction {
    /// Create an instruction with the given payload
    #[must_use]
    pub const fn new(opcode: u8, args: Args) -> Self {
        Self { opcode, args }
    }

    /// Create an instruction without immediates
    #[must_use]
    pub const fn simple(opcode: u8) -> Self {
        Self::new(opcode, Args::None)
    }
}
