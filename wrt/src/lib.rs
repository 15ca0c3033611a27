// WRT - wrt
// Module: WebAssembly Runtime Facade
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! WebAssembly Runtime (WRT)
//!
//! A pure Rust implementation of a WebAssembly MVP decoder and interpreter.
//!
//! WRT is designed to be compatible with both std and no_std environments,
//! making it suitable for a wide range of applications, from server-side
//! WebAssembly execution to embedded systems and bare-metal environments.
//!
//! ## Features
//!
//! - Binary decoding with eager, fail-whole format validation
//! - Stackless execution engine for environments with limited stack space
//! - Host functions, memories, tables and globals supplied as imports
//! - Traps reported as values, never as panics
//!
//! ## Usage
//!
//! ```
//! use wrt::{Imports, Value};
//!
//! let bytes = wat::parse_str(r#"(module (func (export "answer") (result i32) i32.const 42))"#)?;
//! let module = wrt::decode(&bytes)?;
//! let mut instance = wrt::instantiate(module, &mut Imports::new())?;
//! assert_eq!(wrt::invoke(&mut instance, "answer", &[])?, [Value::I32(42)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(clippy::pedantic)]

extern crate alloc;

use alloc::vec::Vec;

pub use wrt_decoder::decode_module;
pub use wrt_error::{codes, Error, ErrorCategory, ErrorContext, Result};
pub use wrt_format::{
    module::{Export, ExportDesc, Module},
    types::{FuncType, GlobalType, Limits, MemoryType, Name, RefType, TableType, ValueType},
};
pub use wrt_runtime::{
    instantiate, instantiate_with_config, Extern, Function, Global, HostFunc, ImportResolver,
    Imports, Memory, ModuleInstance, RuntimeConfig, Table, Value,
};

/// Decode a WebAssembly binary into a [`Module`].
///
/// # Errors
///
/// Returns a parse error for the first violation of the binary format.
pub fn decode(bytes: &[u8]) -> Result<Module> {
    decode_module(bytes)
}

/// Call the function `name` exported by `instance`.
///
/// # Errors
///
/// Returns a runtime error for an unknown export or mismatched arguments,
/// and the trap if execution aborts.
pub fn invoke(instance: &mut ModuleInstance, name: &str, args: &[Value]) -> Result<Vec<Value>> {
    instance.invoke(name, args)
}

/// Decode and instantiate in one step.
///
/// # Errors
///
/// Returns the decode error or the instantiation error, whichever occurs
/// first.
pub fn load<R>(bytes: &[u8], resolver: &mut R) -> Result<ModuleInstance>
where
    R: ImportResolver + ?Sized,
{
    instantiate(decode(bytes)?, resolver)
}
