// WRT - wrt-runtime
// Module: Runtime Values
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Typed WebAssembly values.
//!
//! [`Value`] is what crosses the embedder boundary: arguments and results of
//! [`invoke`](crate::ModuleInstance::invoke) and of host callbacks. Inside
//! the engine every value is an untyped 64-bit cell; [`Value::to_bits`] and
//! [`Value::from_bits`] define that reinterpretation. i32 and f32 occupy the
//! low 32 bits of the cell, zero-extended.

use core::fmt;

use wrt_format::types::ValueType;
use wrt_math::{FloatBits32, FloatBits64};

/// Represents a WebAssembly runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float, kept as its bit pattern
    F32(FloatBits32),
    /// 64-bit float, kept as its bit pattern
    F64(FloatBits64),
}

impl Value {
    /// Creates a default (zero) value for the given WebAssembly value type.
    #[must_use]
    pub const fn default_for_type(ty: ValueType) -> Self {
        match ty {
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F32 => Value::F32(FloatBits32(0)),
            ValueType::F64 => Value::F64(FloatBits64(0)),
        }
    }

    /// Returns the WebAssembly type of this value
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::I32(_) => ValueType::I32,
            Self::I64(_) => ValueType::I64,
            Self::F32(_) => ValueType::F32,
            Self::F64(_) => ValueType::F64,
        }
    }

    /// Checks if this Value matches the specified `ValueType`
    #[must_use]
    pub const fn matches_type(&self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (Self::I32(_), ValueType::I32)
                | (Self::I64(_), ValueType::I64)
                | (Self::F32(_), ValueType::F32)
                | (Self::F64(_), ValueType::F64)
        )
    }

    /// The raw operand-stack cell holding this value.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        match self {
            Self::I32(v) => v as u32 as u64,
            Self::I64(v) => v as u64,
            Self::F32(v) => v.to_bits() as u64,
            Self::F64(v) => v.to_bits(),
        }
    }

    /// Reinterpret a raw cell as a value of type `ty`.
    #[must_use]
    pub const fn from_bits(ty: ValueType, bits: u64) -> Self {
        match ty {
            ValueType::I32 => Self::I32(bits as u32 as i32),
            ValueType::I64 => Self::I64(bits as i64),
            ValueType::F32 => Self::F32(FloatBits32(bits as u32)),
            ValueType::F64 => Self::F64(FloatBits64(bits)),
        }
    }

    /// Attempts to extract an i32 value if this Value is an I32.
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an i64 value if this Value is an I64.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an f32 value if this Value is an F32.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(v.value()),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value if this Value is an F64.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(v.value()),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(FloatBits32::from_float(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(FloatBits64::from_float(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "i32:{v}"),
            Self::I64(v) => write!(f, "i64:{v}"),
            Self::F32(v) => write!(f, "f32:{}", v.value()),
            Self::F64(v) => write!(f, "f64:{}", v.value()),
        }
    }
}
