// WRT - wrt-format
// Module: WebAssembly Module Representation
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly module format.
//!
//! A [`Module`] is the decoded, read-only form of one binary module. It holds
//! one vector per known section plus every custom section in the order it
//! was encountered.

use alloc::vec::Vec;

use wrt_error::{codes, Error, Result};

use crate::{
    instructions::Expr,
    types::{BlockType, FuncType, GlobalType, MemoryType, Name, TableType, ValueType},
};

/// Import descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDesc {
    /// Function with the given type index
    Func(u32),
    /// Table
    Table(TableType),
    /// Linear memory
    Memory(MemoryType),
    /// Global variable
    Global(GlobalType),
}

/// A module import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Module name
    pub module: Name,
    /// Field name
    pub name:   Name,
    /// Imported entity
    pub desc:   ImportDesc,
}

/// Export descriptor: entity kind plus index into that kind's index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportDesc {
    /// Function index
    Func(u32),
    /// Table index
    Table(u32),
    /// Memory index
    Memory(u32),
    /// Global index
    Global(u32),
}

/// A module export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Export name
    pub name: Name,
    /// Exported entity
    pub desc: ExportDesc,
}

/// A module-defined global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// Global type
    pub ty:   GlobalType,
    /// Constant initializer expression
    pub init: Expr,
}

/// An active element segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Target table index
    pub table:  u32,
    /// Offset expression
    pub offset: Expr,
    /// Function indices written starting at the offset
    pub init:   Vec<u32>,
}

/// An active data segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    /// Target memory index
    pub memory: u32,
    /// Offset expression
    pub offset: Expr,
    /// Bytes written starting at the offset
    pub init:   Vec<u8>,
}

/// Run-length encoded local declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locals {
    /// Number of locals of this type
    pub count:      u32,
    /// Type of these locals
    pub value_type: ValueType,
}

/// Body of a module-defined function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code {
    /// Local declarations, excluding parameters
    pub locals: Vec<Locals>,
    /// Instruction tree of the body
    pub body:   Expr,
}

impl Code {
    /// Total number of declared locals, excluding parameters.
    ///
    /// # Errors
    ///
    /// Returns `TOO_MANY_LOCALS` if the sum does not fit in `u32`.
    pub fn local_count(&self) -> Result<u32> {
        let total: u64 = self.locals.iter().map(|l| u64::from(l.count)).sum();
        u32::try_from(total)
            .map_err(|_| Error::parse_error(codes::TOO_MANY_LOCALS, "Too many locals"))
    }

    /// Expanded local types, excluding parameters.
    pub fn local_types(&self) -> impl Iterator<Item = ValueType> + '_ {
        self.locals
            .iter()
            .flat_map(|l| core::iter::repeat_n(l.value_type, l.count as usize))
    }
}

/// A custom section: a name plus opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    /// Section name
    pub name: Name,
    /// Payload after the name
    pub data: Vec<u8>,
}

/// A decoded WebAssembly module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    /// Magic number, as a little-endian word
    pub magic:     u32,
    /// Binary format version
    pub version:   u32,
    /// Custom sections in encounter order
    pub customs:   Vec<CustomSection>,
    /// Type section
    pub types:     Vec<FuncType>,
    /// Import section
    pub imports:   Vec<Import>,
    /// Function section: type index of each defined function
    pub functions: Vec<u32>,
    /// Table section
    pub tables:    Vec<TableType>,
    /// Memory section
    pub memories:  Vec<MemoryType>,
    /// Global section
    pub globals:   Vec<Global>,
    /// Export section
    pub exports:   Vec<Export>,
    /// Start function index
    pub start:     Option<u32>,
    /// Element section
    pub elements:  Vec<Element>,
    /// Code section
    pub code:      Vec<Code>,
    /// Data section
    pub data:      Vec<Data>,
}

impl Module {
    /// Create an empty module
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of imported functions; these precede defined functions in the
    /// function index space.
    #[must_use]
    pub fn imported_function_count(&self) -> usize {
        self.imports.iter().filter(|i| matches!(i.desc, ImportDesc::Func(_))).count()
    }

    /// Number of imported tables
    #[must_use]
    pub fn imported_table_count(&self) -> usize {
        self.imports.iter().filter(|i| matches!(i.desc, ImportDesc::Table(_))).count()
    }

    /// Number of imported memories
    #[must_use]
    pub fn imported_memory_count(&self) -> usize {
        self.imports.iter().filter(|i| matches!(i.desc, ImportDesc::Memory(_))).count()
    }

    /// Number of imported globals
    #[must_use]
    pub fn imported_global_count(&self) -> usize {
        self.imports.iter().filter(|i| matches!(i.desc, ImportDesc::Global(_))).count()
    }

    /// Type index of a function in the combined (imported + defined) index
    /// space.
    #[must_use]
    pub fn function_type_index(&self, func_idx: u32) -> Option<u32> {
        let mut imported = self.imports.iter().filter_map(|i| match i.desc {
            ImportDesc::Func(type_idx) => Some(type_idx),
            _ => None,
        });
        let idx = func_idx as usize;
        let import_count = self.imported_function_count();
        if idx < import_count {
            imported.nth(idx)
        } else {
            self.functions.get(idx - import_count).copied()
        }
    }

    /// Signature of a function in the combined index space
    #[must_use]
    pub fn function_type(&self, func_idx: u32) -> Option<&FuncType> {
        self.function_type_index(func_idx)
            .and_then(|type_idx| self.types.get(type_idx as usize))
    }

    /// Resolve a block type to its signature.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_TYPE_INDEX` if a type-index block type is out of
    /// range.
    pub fn block_signature(&self, block_type: BlockType) -> Result<FuncType> {
        block_type.signature(&self.types).map(alloc::borrow::Cow::into_owned)
    }

    /// Look up an export by name
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// Look up a custom section by name
    #[must_use]
    pub fn custom_section(&self, name: &str) -> Option<&CustomSection> {
        self.customs.iter().find(|c| c.name == name)
    }
}
