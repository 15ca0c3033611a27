// WRT - wrt-runtime
// Module: Control Frames
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Stackless control frame
//!
//! One frame per active structured scope or function activation. Frames
//! borrow their instruction sequence from the function body they belong to.

use wrt_format::instructions::Instruction;

/// The construct that opened a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `block`
    Block,
    /// `loop`; branching to it restarts the body
    Loop,
    /// The taken arm of an `if`
    If,
    /// A function activation
    Call,
}

/// Entry of the control-flow stack
#[derive(Debug, Clone)]
pub struct StacklessFrame<'a> {
    /// What opened this frame
    pub kind:        FrameKind,
    /// Values the scope consumes, and the label arity of a loop
    pub params:      usize,
    /// Values the scope leaves behind, and the label arity otherwise
    pub results:     usize,
    /// Instruction sequence being executed
    pub instrs:      &'a [Instruction],
    /// Next instruction in `instrs`
    pub pc:          usize,
    /// Operand-stack height below the scope's parameters
    pub bp:          usize,
    /// Operand-stack position of local 0 of the enclosing activation
    pub locals:      usize,
    /// Parameters plus declared locals of the enclosing activation
    pub local_count: usize,
    /// Control-stack index of the enclosing `Call` frame
    pub call:        usize,
}

impl StacklessFrame<'_> {
    /// Values a branch to this frame carries.
    pub const fn label_arity(&self) -> usize {
        match self.kind {
            FrameKind::Loop => self.params,
            _ => self.results,
        }
    }
}
