// WRT - wrt-runtime
// Module: Runtime Configuration
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Runtime limits applied to every invocation.

/// Default limit on nested function activations.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Default limit on operand-stack cells, locals included.
pub const DEFAULT_MAX_OPERAND_STACK: usize = 1024 * 1024;

/// Configuration for a module instance.
///
/// Exceeding either limit traps the current invocation instead of exhausting
/// host memory or the host call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of nested function activations
    pub max_call_depth: usize,
    /// Maximum number of operand-stack cells
    pub max_operand_stack: usize,
}

impl RuntimeConfig {
    /// Create a configuration with the default limits
    pub const fn new() -> Self {
        Self { max_call_depth: DEFAULT_MAX_CALL_DEPTH, max_operand_stack: DEFAULT_MAX_OPERAND_STACK }
    }

    /// Set the maximum call depth
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Set the maximum operand-stack size in cells
    #[must_use]
    pub const fn with_max_operand_stack(mut self, cells: usize) -> Self {
        self.max_operand_stack = cells;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
