// WRT - wrt-runtime
// Module: Import Resolution
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Embedder-supplied imports.
//!
//! Instantiation asks an [`ImportResolver`] for every import of the module,
//! in declaration order. [`Imports`] is a name-keyed registry that satisfies
//! the same two-level `module`/`name` lookup the binary format uses.

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

use wrt_error::Result;
use wrt_format::types::{FuncType, Name};

use crate::{func::Function, global::Global, memory::Memory, table::Table, value::Value};

/// A value that can satisfy an import.
#[derive(Debug, Clone)]
pub enum Extern {
    /// A function, normally [`Function::Host`]
    Func(Function),
    /// A table, copied into the instance on instantiation
    Table(Table),
    /// A linear memory, copied into the instance on instantiation
    ///
    /// The instance owns its copy. Stores and `memory.grow` executed by the
    /// module are visible through the instance's accessors, not through the
    /// value the embedder registered.
    Memory(Memory),
    /// A global
    Global(Global),
}

impl Extern {
    /// Kind name used in diagnostics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Func(_) => "func",
            Self::Table(_) => "table",
            Self::Memory(_) => "memory",
            Self::Global(_) => "global",
        }
    }
}

/// Source of import values during instantiation.
pub trait ImportResolver {
    /// Provide the value for import `module`.`name`, or `None` if unknown.
    fn resolve(&mut self, module: &Name, name: &Name) -> Option<Extern>;
}

impl<F> ImportResolver for F
where
    F: FnMut(&Name, &Name) -> Option<Extern>,
{
    fn resolve(&mut self, module: &Name, name: &Name) -> Option<Extern> {
        self(module, name)
    }
}

/// Registry of named externs, keyed by module then field name.
///
/// Resolving clones the registered extern, so one host function can satisfy
/// any number of imports. Memories and tables are copied on resolution.
#[derive(Debug, Clone, Default)]
pub struct Imports {
    entries: BTreeMap<String, BTreeMap<String, Extern>>,
}

impl Imports {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` as `module`.`name`, replacing any earlier entry.
    pub fn define(&mut self, module: &str, name: &str, value: Extern) -> &mut Self {
        self.entries.entry(module.to_string()).or_default().insert(name.to_string(), value);
        self
    }

    /// Register a host function.
    pub fn func<F>(&mut self, module: &str, name: &str, ty: FuncType, callback: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.define(module, name, Extern::Func(Function::host(ty, callback)))
    }

    /// Look up a registered extern.
    pub fn get(&self, module: &str, name: &str) -> Option<&Extern> {
        self.entries.get(module)?.get(name)
    }
}

impl ImportResolver for Imports {
    fn resolve(&mut self, module: &Name, name: &Name) -> Option<Extern> {
        self.get(module.as_str()?, name.as_str()?).cloned()
    }
}
