// WRT - wrt-runtime
// Module: Global Instances
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly global value implementation
//!
//! This module provides the implementation for WebAssembly globals.

use wrt_error::{codes, Error, Result};
use wrt_format::types::GlobalType;

use crate::value::Value;

const TYPE_MISMATCH: Error =
    Error::runtime_error(codes::TYPE_MISMATCH, "Value type doesn't match global type");

/// Represents a WebAssembly global variable in the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// The global type (value_type and mutability).
    ty:   GlobalType,
    /// The current value as a raw cell, interpreted per `ty.value_type`.
    bits: u64,
}

impl Global {
    /// Create a new runtime Global instance.
    pub fn new(ty: GlobalType, initial_value: Value) -> Result<Self> {
        if !initial_value.matches_type(ty.value_type) {
            return Err(TYPE_MISMATCH);
        }
        Ok(Self { ty, bits: initial_value.to_bits() })
    }

    /// The declared type.
    pub const fn ty(&self) -> GlobalType {
        self.ty
    }

    /// Raw cell for the engine.
    pub const fn get_bits(&self) -> u64 {
        self.bits
    }

    /// Overwrite the raw cell. Immutable globals trap.
    pub fn set_bits(&mut self, bits: u64) -> Result<()> {
        if !self.ty.mutable {
            return Err(Error::IMMUTABLE_GLOBAL);
        }
        self.bits = bits;
        Ok(())
    }

    /// Get the current runtime value of the global.
    pub const fn value(&self) -> Value {
        Value::from_bits(self.ty.value_type, self.bits)
    }

    /// Set the runtime value of the global.
    /// Returns an error if the global is immutable or if the value type
    /// mismatches.
    pub fn set_value(&mut self, value: Value) -> Result<()> {
        if !value.matches_type(self.ty.value_type) {
            return Err(TYPE_MISMATCH);
        }
        self.set_bits(value.to_bits())
    }
}
