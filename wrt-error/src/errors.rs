// WRT - wrt-error
// Module: WRT Error Types
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

/// Unified error type for the decoder and the interpreter.
///
/// Parse failures and traps share one type but stay distinguishable through
/// [`ErrorCategory`].
use core::fmt;

use crate::{codes, ErrorContext};

/// `Error` categories for WRT operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Resource errors (limits, capacity)
    Resource       = 3,
    /// Runtime API misuse (bad arguments, unknown exports)
    Runtime        = 7,
    /// Malformed binary input
    Parse          = 10,
    /// WebAssembly trap errors (specific runtime errors defined by Wasm spec)
    RuntimeTrap    = 13,
    /// Instantiation errors (imports, segments)
    Initialization = 14,
}

/// WRT `Error` type
///
/// This is the main error type for the WebAssembly Runtime.
/// It provides categorized errors with error codes, a static message and an
/// optional context describing where the error was detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code:     u16,
    /// `Error` message
    pub message:  &'static str,
    /// Optional localising detail
    pub context:  Option<ErrorContext>,
}

impl Error {
    /// Input ended prematurely
    pub const UNEXPECTED_END: Self = Self::parse_error(codes::UNEXPECTED_END, "Unexpected end");
    /// `unreachable` instruction executed
    pub const UNREACHABLE: Self = Self::runtime_trap(codes::UNREACHABLE, "Unreachable executed");
    /// Integer division by zero
    pub const DIVISION_BY_ZERO: Self =
        Self::runtime_trap(codes::DIVISION_BY_ZERO, "Integer divide by zero");
    /// Integer overflow
    pub const INTEGER_OVERFLOW: Self =
        Self::runtime_trap(codes::INTEGER_OVERFLOW, "Integer overflow");
    /// NaN to integer conversion
    pub const INVALID_CONVERSION: Self =
        Self::runtime_trap(codes::INVALID_CONVERSION, "Invalid conversion to integer");
    /// Call stack exhausted
    pub const CALL_STACK_EXHAUSTED: Self =
        Self::runtime_trap(codes::CALL_STACK_EXHAUSTED, "Call stack exhausted");
    /// Operand stack overflow
    pub const STACK_OVERFLOW: Self = Self::runtime_trap(codes::STACK_OVERFLOW, "Stack overflow");
    /// Operand or control stack underflow
    pub const STACK_UNDERFLOW: Self =
        Self::runtime_trap(codes::STACK_UNDERFLOW, "Stack underflow");
    /// Indirect call through a slot holding no function
    pub const UNINITIALIZED_ELEMENT: Self =
        Self::runtime_trap(codes::UNINITIALIZED_ELEMENT, "Uninitialized element");
    /// Indirect call signature mismatch
    pub const INDIRECT_CALL_TYPE_MISMATCH: Self =
        Self::runtime_trap(codes::INDIRECT_CALL_TYPE_MISMATCH, "Indirect call type mismatch");
    /// Write to an immutable global
    pub const IMMUTABLE_GLOBAL: Self =
        Self::runtime_trap(codes::IMMUTABLE_GLOBAL, "Global is immutable");

    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self {
            category,
            code,
            message,
            context: None,
        }
    }

    /// Create a parse error for malformed binary input
    #[must_use]
    pub const fn parse_error(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Parse, code, message)
    }

    /// Create a WebAssembly trap
    #[must_use]
    pub const fn runtime_trap(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::RuntimeTrap, code, message)
    }

    /// Create an instantiation error
    #[must_use]
    pub const fn initialization_error(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Initialization, code, message)
    }

    /// Create a runtime API error
    #[must_use]
    pub const fn runtime_error(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, code, message)
    }

    /// Create a resource error
    #[must_use]
    pub const fn resource_error(code: u16, message: &'static str) -> Self {
        Self::new(ErrorCategory::Resource, code, message)
    }

    /// Attach localising detail, replacing any previous context.
    #[must_use]
    pub const fn with_context(self, context: ErrorContext) -> Self {
        Self {
            context: Some(context),
            ..self
        }
    }

    /// Check if this is a WebAssembly trap
    #[must_use]
    pub const fn is_trap(&self) -> bool {
        matches!(self.category, ErrorCategory::RuntimeTrap)
    }

    /// Check if this is a parse error
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self.category, ErrorCategory::Parse)
    }

    /// Check if this is an instantiation error
    #[must_use]
    pub const fn is_initialization_error(&self) -> bool {
        matches!(self.category, ErrorCategory::Initialization)
    }

    /// Check if this is a runtime API error
    #[must_use]
    pub const fn is_runtime_error(&self) -> bool {
        matches!(self.category, ErrorCategory::Runtime)
    }

    /// Check if this is a resource error
    #[must_use]
    pub const fn is_resource_error(&self) -> bool {
        matches!(self.category, ErrorCategory::Resource)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}][E{:04X}] {}",
            self.category, self.code, self.message
        )?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::runtime_error(codes::TYPE_MISMATCH, "Formatting error")
    }
}
