// WRT - wrt-runtime
// Module: Module Instances
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Module instance implementation for WebAssembly runtime
//!
//! This module provides the implementation of a WebAssembly module instance,
//! which represents a runtime instance of a WebAssembly module with its own
//! memory, tables, globals, and functions.
//!
//! Instantiation links imports, allocates every instance, evaluates constant
//! initialisers, bounds-checks all segments before writing any of them, and
//! finally runs the start function.

use alloc::vec::Vec;

use tracing::{debug, debug_span};
use wrt_error::{codes, kinds, Error, ErrorContext, Result};
use wrt_format::{
    binary as op,
    instructions::{Args, Expr},
    module::{Export, ExportDesc, Import, ImportDesc, Module},
    types::{FuncType, Limits},
};

use crate::{
    config::RuntimeConfig,
    func::Function,
    global::Global,
    imports::{Extern, ImportResolver},
    memory::Memory,
    stackless::StacklessEngine,
    table::Table,
    value::Value,
};

/// Mutable state of an instance: everything execution may write.
#[derive(Debug, Clone, Default)]
pub struct Store {
    /// Linear memories, imported first
    pub memories: Vec<Memory>,
    /// Tables, imported first
    pub tables:   Vec<Table>,
    /// Globals, imported first
    pub globals:  Vec<Global>,
}

/// Represents a runtime instance of a WebAssembly module
#[derive(Debug)]
pub struct ModuleInstance {
    types:     Vec<FuncType>,
    functions: Vec<Function>,
    store:     Store,
    exports:   Vec<Export>,
    config:    RuntimeConfig,
}

/// Instantiate `module` with default limits.
///
/// # Errors
///
/// Returns an initialization error if linking or segment initialisation
/// fails, or the trap raised by the start function.
pub fn instantiate<R>(module: Module, resolver: &mut R) -> Result<ModuleInstance>
where
    R: ImportResolver + ?Sized,
{
    instantiate_with_config(module, resolver, RuntimeConfig::default())
}

/// Instantiate `module`, resolving its imports through `resolver`.
pub fn instantiate_with_config<R>(
    module: Module,
    resolver: &mut R,
    config: RuntimeConfig,
) -> Result<ModuleInstance>
where
    R: ImportResolver + ?Sized,
{
    let _span = debug_span!("instantiate", imports = module.imports.len()).entered();

    let mut functions = Vec::with_capacity(module.imports.len() + module.functions.len());
    let mut store = Store::default();

    for (idx, import) in module.imports.iter().enumerate() {
        let value = resolver.resolve(&import.module, &import.name).ok_or(
            Error::initialization_error(codes::UNKNOWN_IMPORT, "Unknown import")
                .with_context(ErrorContext::Index { space: "import", index: idx as u32 }),
        )?;
        link_import(idx as u32, import, value, &module.types, &mut functions, &mut store)?;
    }

    if module.functions.len() != module.code.len() {
        return Err(Error::initialization_error(
            codes::FUNCTION_CODE_MISMATCH,
            "Function and code section have inconsistent lengths",
        ));
    }
    let Module { types, functions: type_indices, code, tables, memories, globals, .. } = module;
    for (type_idx, code) in type_indices.into_iter().zip(code) {
        let ty = types.get(type_idx as usize).cloned().ok_or(kinds::invalid_index(
            codes::INVALID_TYPE_INDEX,
            "Type index out of range",
            "type",
            type_idx,
        ))?;
        functions.push(Function::Internal { ty, code });
    }

    if store.tables.len() + tables.len() > 1 || store.memories.len() + memories.len() > 1 {
        return Err(Error::initialization_error(
            codes::MULTIPLE_MEMORIES_OR_TABLES,
            "At most one memory and one table are supported",
        ));
    }
    for ty in tables {
        store.tables.push(Table::new(ty)?);
    }
    for ty in memories {
        store.memories.push(Memory::new(ty)?);
    }

    for global in &globals {
        let value = evaluate_const_expr(&global.init, &store.globals)?;
        let global = Global::new(global.ty, value).map_err(|_| CONST_EXPR_TYPE)?;
        store.globals.push(global);
    }

    initialize_segments(&module.elements, &module.data, functions.len(), &mut store)?;

    let mut instance = ModuleInstance { types, functions, store, exports: module.exports, config };
    debug!(
        functions = instance.functions.len(),
        memories = instance.store.memories.len(),
        globals = instance.store.globals.len(),
        "instantiated"
    );

    if let Some(start) = module.start {
        instance.invoke_index(start, &[])?;
    }
    Ok(instance)
}

const CONST_EXPR_TYPE: Error = Error::initialization_error(
    codes::INVALID_CONST_EXPR,
    "Constant expression has the wrong type",
);

fn import_mismatch(idx: u32) -> Error {
    Error::initialization_error(codes::IMPORT_TYPE_MISMATCH, "Import doesn't match its declaration")
        .with_context(ErrorContext::Index { space: "import", index: idx })
}

fn link_import(
    idx: u32,
    import: &Import,
    value: Extern,
    types: &[FuncType],
    functions: &mut Vec<Function>,
    store: &mut Store,
) -> Result<()> {
    match (&import.desc, value) {
        (&ImportDesc::Func(type_idx), Extern::Func(function)) => {
            if types.get(type_idx as usize) != Some(function.ty()) {
                return Err(import_mismatch(idx));
            }
            functions.push(function);
        }
        (ImportDesc::Table(expected), Extern::Table(table)) => {
            let actual = Limits::new(table.size(), table.ty.limits.max);
            if table.ty.element != expected.element || !actual.satisfies(&expected.limits) {
                return Err(import_mismatch(idx));
            }
            store.tables.push(table);
        }
        (ImportDesc::Memory(expected), Extern::Memory(memory)) => {
            let actual = Limits::new(memory.size(), memory.ty.limits.max);
            if !actual.satisfies(&expected.limits) {
                return Err(import_mismatch(idx));
            }
            store.memories.push(memory);
        }
        (ImportDesc::Global(expected), Extern::Global(global)) => {
            if global.ty() != *expected {
                return Err(import_mismatch(idx));
            }
            store.globals.push(global);
        }
        _ => return Err(import_mismatch(idx)),
    }
    Ok(())
}

/// Evaluate an initialiser: one constant instruction or `global.get`.
fn evaluate_const_expr(expr: &Expr, globals: &[Global]) -> Result<Value> {
    const INVALID: Error =
        Error::initialization_error(codes::INVALID_CONST_EXPR, "Unsupported constant expression");

    let [instr] = expr.as_slice() else {
        return Err(INVALID);
    };
    match (instr.opcode, &instr.args) {
        (op::I32_CONST, &Args::I32(v)) => Ok(Value::I32(v)),
        (op::I64_CONST, &Args::I64(v)) => Ok(Value::I64(v)),
        (op::F32_CONST, &Args::F32(bits)) => Ok(Value::F32(wrt_math::FloatBits32(bits))),
        (op::F64_CONST, &Args::F64(bits)) => Ok(Value::F64(wrt_math::FloatBits64(bits))),
        (op::GLOBAL_GET, &Args::Index(idx)) => {
            globals.get(idx as usize).map(Global::value).ok_or(kinds::invalid_index(
                codes::INVALID_GLOBAL_INDEX,
                "Global index out of range",
                "global",
                idx,
            ))
        }
        _ => Err(INVALID),
    }
}

fn segment_offset(expr: &Expr, globals: &[Global]) -> Result<u32> {
    match evaluate_const_expr(expr, globals)? {
        Value::I32(offset) => Ok(offset as u32),
        _ => Err(CONST_EXPR_TYPE),
    }
}

fn segment_out_of_bounds(space: &'static str, index: usize) -> Error {
    Error::initialization_error(codes::SEGMENT_OUT_OF_BOUNDS, "Segment doesn't fit its target")
        .with_context(ErrorContext::Index { space, index: index as u32 })
}

/// Check every element and data segment, then write them all.
fn initialize_segments(
    elements: &[wrt_format::module::Element],
    data: &[wrt_format::module::Data],
    function_count: usize,
    store: &mut Store,
) -> Result<()> {
    let mut element_offsets = Vec::with_capacity(elements.len());
    for (idx, segment) in elements.iter().enumerate() {
        let offset = segment_offset(&segment.offset, &store.globals)?;
        let table = store.tables.get(segment.table as usize).ok_or(segment_out_of_bounds("elem", idx))?;
        if u64::from(offset) + segment.init.len() as u64 > u64::from(table.size()) {
            return Err(segment_out_of_bounds("elem", idx));
        }
        if let Some(&func_idx) = segment.init.iter().find(|&&f| f as usize >= function_count) {
            return Err(kinds::invalid_index(
                codes::INVALID_FUNCTION_INDEX,
                "Function index out of range",
                "function",
                func_idx,
            ));
        }
        element_offsets.push(offset);
    }

    let mut data_offsets = Vec::with_capacity(data.len());
    for (idx, segment) in data.iter().enumerate() {
        let offset = segment_offset(&segment.offset, &store.globals)?;
        let memory =
            store.memories.get(segment.memory as usize).ok_or(segment_out_of_bounds("data", idx))?;
        if u64::from(offset) + segment.init.len() as u64 > memory.size_in_bytes() as u64 {
            return Err(segment_out_of_bounds("data", idx));
        }
        data_offsets.push(offset);
    }

    for (segment, offset) in elements.iter().zip(element_offsets) {
        store.tables[segment.table as usize].init(offset, &segment.init)?;
    }
    for (segment, offset) in data.iter().zip(data_offsets) {
        store.memories[segment.memory as usize].write(u64::from(offset), &segment.init)?;
    }
    Ok(())
}

impl ModuleInstance {
    /// Call an exported function by name.
    ///
    /// # Errors
    ///
    /// `EXPORT_NOT_FOUND` if `name` is not an exported function,
    /// `INVALID_ARGUMENTS` if `args` don't match its parameters, or the trap
    /// that aborted execution. A trap leaves memories, tables and globals
    /// with whatever was written before it; the instance stays usable.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Vec<Value>> {
        match self.export(name) {
            Some(ExportDesc::Func(func_idx)) => self.invoke_index(func_idx, args),
            _ => Err(kinds::export_not_found()),
        }
    }

    /// Call a function by its index in the function index space.
    pub fn invoke_index(&mut self, func_idx: u32, args: &[Value]) -> Result<Vec<Value>> {
        let _span = debug_span!("invoke", func_idx).entered();

        let ty = self.function_type(func_idx).ok_or(kinds::invalid_index(
            codes::INVALID_FUNCTION_INDEX,
            "Function index out of range",
            "function",
            func_idx,
        ))?;
        let matches = args.len() == ty.params.len()
            && args.iter().zip(&ty.params).all(|(arg, &ty)| arg.matches_type(ty));
        if !matches {
            return Err(kinds::invalid_arguments());
        }

        let mut engine =
            StacklessEngine::new(&self.functions, &self.types, &mut self.store, self.config);
        engine.invoke(func_idx, args).inspect_err(|error| debug!(%error, "invocation aborted"))
    }

    /// Signature of function `func_idx`
    pub fn function_type(&self, func_idx: u32) -> Option<&FuncType> {
        self.functions.get(func_idx as usize).map(Function::ty)
    }

    /// The module's exports
    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    /// Descriptor of export `name`
    pub fn export(&self, name: &str) -> Option<ExportDesc> {
        self.exports.iter().find(|export| export.name == name).map(|export| export.desc)
    }

    /// Limits applied to invocations
    pub const fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Get a memory from this instance
    pub fn memory(&self, idx: u32) -> Option<&Memory> {
        self.store.memories.get(idx as usize)
    }

    /// Mutable access to a memory
    pub fn memory_mut(&mut self, idx: u32) -> Option<&mut Memory> {
        self.store.memories.get_mut(idx as usize)
    }

    /// Get a table from this instance
    pub fn table(&self, idx: u32) -> Option<&Table> {
        self.store.tables.get(idx as usize)
    }

    /// Mutable access to a table
    pub fn table_mut(&mut self, idx: u32) -> Option<&mut Table> {
        self.store.tables.get_mut(idx as usize)
    }

    /// Get a global from this instance
    pub fn global(&self, idx: u32) -> Option<&Global> {
        self.store.globals.get(idx as usize)
    }

    /// Mutable access to a global
    pub fn global_mut(&mut self, idx: u32) -> Option<&mut Global> {
        self.store.globals.get_mut(idx as usize)
    }

    /// The memory exported as `name`
    pub fn exported_memory(&self, name: &str) -> Option<&Memory> {
        match self.export(name)? {
            ExportDesc::Memory(idx) => self.memory(idx),
            _ => None,
        }
    }

    /// The global exported as `name`
    pub fn exported_global(&self, name: &str) -> Option<&Global> {
        match self.export(name)? {
            ExportDesc::Global(idx) => self.global(idx),
            _ => None,
        }
    }

    /// Mutable access to the global exported as `name`
    pub fn exported_global_mut(&mut self, name: &str) -> Option<&mut Global> {
        match self.export(name)? {
            ExportDesc::Global(idx) => self.global_mut(idx),
            _ => None,
        }
    }
}
