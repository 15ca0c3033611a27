// WRT - wrt-format
// Module: WebAssembly Type Definitions
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly type definitions.

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::fmt;

use wrt_error::{codes, kinds, Error, ErrorContext, Result};

use crate::binary;

/// WebAssembly value types.
///
/// The MVP value types form a closed set; any other byte in a value-type
/// position is a format error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// 32-bit integer
    #[default]
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl ValueType {
    /// Create a value type from its binary encoding
    pub fn from_binary(byte: u8) -> Result<Self> {
        match byte {
            binary::I32_TYPE => Ok(Self::I32),
            binary::I64_TYPE => Ok(Self::I64),
            binary::F32_TYPE => Ok(Self::F32),
            binary::F64_TYPE => Ok(Self::F64),
            _ => Err(kinds::malformed_byte(
                codes::INVALID_VALUE_TYPE,
                "Invalid value type",
                "value type",
                byte,
            )),
        }
    }

    /// Convert to the WebAssembly binary encoding
    #[must_use]
    pub const fn to_binary(self) -> u8 {
        match self {
            Self::I32 => binary::I32_TYPE,
            Self::I64 => binary::I64_TYPE,
            Self::F32 => binary::F32_TYPE,
            Self::F64 => binary::F64_TYPE,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A function signature: parameter types and result types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FuncType {
    /// Parameter types, in order
    pub params:  Vec<ValueType>,
    /// Result types, in order
    pub results: Vec<ValueType>,
}

impl FuncType {
    /// Create a new function type
    #[must_use]
    pub fn new(params: Vec<ValueType>, results: Vec<ValueType>) -> Self {
        Self { params, results }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(") -> (")?;
        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{result}")?;
        }
        f.write_str(")")
    }
}

/// Signature of a structured control instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// No parameters, no results (`0x40`)
    Empty,
    /// No parameters, a single result
    Value(ValueType),
    /// Arbitrary signature from the type section
    TypeIndex(u32),
}

impl BlockType {
    /// Interpret a signed LEB128 block-type value.
    ///
    /// The five negative sentinels map to [`BlockType::Empty`] and
    /// [`BlockType::Value`]; a non-negative value is a type index.
    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            binary::BLOCK_TYPE_EMPTY => Ok(Self::Empty),
            binary::BLOCK_TYPE_I32 => Ok(Self::Value(ValueType::I32)),
            binary::BLOCK_TYPE_I64 => Ok(Self::Value(ValueType::I64)),
            binary::BLOCK_TYPE_F32 => Ok(Self::Value(ValueType::F32)),
            binary::BLOCK_TYPE_F64 => Ok(Self::Value(ValueType::F64)),
            _ => u32::try_from(value).map(Self::TypeIndex).map_err(|_| {
                Error::parse_error(codes::INVALID_BLOCK_TYPE, "Invalid block type")
                    .with_context(ErrorContext::Value { field: "block type", value })
            }),
        }
    }

    /// Resolve to a full signature using the module's type section.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_TYPE_INDEX` if the type index is out of range.
    pub fn signature<'a>(&self, types: &'a [FuncType]) -> Result<Cow<'a, FuncType>> {
        match *self {
            Self::Empty => Ok(Cow::Owned(FuncType::default())),
            Self::Value(ty) => Ok(Cow::Owned(FuncType::new(Vec::new(), alloc::vec![ty]))),
            Self::TypeIndex(idx) => types
                .get(idx as usize)
                .map(Cow::Borrowed)
                .ok_or_else(|| invalid_type_index(idx)),
        }
    }

    /// Parameter and result counts of this block type.
    pub fn arity(&self, types: &[FuncType]) -> Result<(usize, usize)> {
        match *self {
            Self::Empty => Ok((0, 0)),
            Self::Value(_) => Ok((0, 1)),
            Self::TypeIndex(idx) => types
                .get(idx as usize)
                .map(|ty| (ty.params.len(), ty.results.len()))
                .ok_or_else(|| invalid_type_index(idx)),
        }
    }
}

fn invalid_type_index(index: u32) -> Error {
    kinds::invalid_index(codes::INVALID_TYPE_INDEX, "Invalid type index", "type", index)
}

/// Size limits for memories (in pages) and tables (in elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Limits {
    /// Minimum size
    pub min: u32,
    /// Maximum size, if declared
    pub max: Option<u32>,
}

impl Limits {
    /// Create new limits
    #[must_use]
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Check that `self` (the supplied limits) satisfies `required` (the
    /// declared limits) for import matching.
    #[must_use]
    pub fn satisfies(&self, required: &Self) -> bool {
        if self.min < required.min {
            return false;
        }
        match (self.max, required.max) {
            (_, None) => true,
            (Some(max), Some(required_max)) => max <= required_max,
            (None, Some(_)) => false,
        }
    }
}

/// Linear memory type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryType {
    /// Limits in 64 KiB pages
    pub limits: Limits,
}

/// Reference types storable in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefType {
    /// Function reference (`0x70`)
    #[default]
    FuncRef,
}

impl RefType {
    /// Create a reference type from its binary encoding
    pub fn from_binary(byte: u8) -> Result<Self> {
        match byte {
            binary::FUNCREF_TYPE => Ok(Self::FuncRef),
            _ => Err(kinds::malformed_byte(
                codes::INVALID_ELEMENT_TYPE,
                "Invalid table element type",
                "element type",
                byte,
            )),
        }
    }
}

/// Table type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TableType {
    /// Element type
    pub element: RefType,
    /// Limits in elements
    pub limits:  Limits,
}

/// Global variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalType {
    /// Type of the stored value
    pub value_type: ValueType,
    /// Whether `global.set` may write it
    pub mutable:    bool,
}

impl GlobalType {
    /// Decode a mutability flag (0 = const, 1 = var)
    pub fn mutability_from_binary(byte: u8) -> Result<bool> {
        match byte {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(kinds::malformed_byte(
                codes::INVALID_MUTABILITY,
                "Invalid mutability",
                "mutability",
                byte,
            )),
        }
    }
}

/// A name from the binary format.
///
/// Names are stored as the raw bytes found in the binary; UTF-8 is not
/// validated during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Name(Vec<u8>);

impl Name {
    /// Wrap raw name bytes
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the name
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The name as a string slice, if it is valid UTF-8
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }

    /// Lossy string conversion
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
