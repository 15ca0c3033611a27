// WRT - wrt-runtime
// Module: WebAssembly Runtime Core
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! WebAssembly Runtime (WRT) - Runtime Implementation
//!
//! This crate instantiates decoded modules and executes them with a
//! stackless interpreter: control flow lives on an explicit frame stack
//! instead of the host call stack, so deep wasm recursion is bounded by
//! [`RuntimeConfig`] rather than by native stack space.
//!
//! Every failure during execution is a trap carried in
//! [`wrt_error::Error`]. A trap aborts the current invocation only; the
//! instance keeps every memory, table and global write made before it.
//!
//! ```
//! use wrt_runtime::{instantiate, Imports, Value};
//!
//! let bytes = wat::parse_str(
//!     r#"(module (func (export "add") (param i32 i32) (result i32)
//!         local.get 0 local.get 1 i32.add))"#,
//! )
//! .unwrap();
//! let module = wrt_decoder::decode_module(&bytes).unwrap();
//! let mut instance = instantiate(module, &mut Imports::new()).unwrap();
//! let results = instance.invoke("add", &[Value::I32(2), Value::I32(40)]).unwrap();
//! assert_eq!(results, [Value::I32(42)]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Execution limits
pub mod config;
/// Internal and host functions
pub mod func;
/// Global variable instances
pub mod global;
/// Import resolution
pub mod imports;
/// Linear memory instances
pub mod memory;
/// Module instantiation and invocation
pub mod module_instance;
/// Stackless interpreter
pub mod stackless;
/// Table instances
pub mod table;
/// Runtime values
pub mod value;

pub use config::RuntimeConfig;
pub use func::{Function, HostFunc};
pub use global::Global;
pub use imports::{Extern, ImportResolver, Imports};
pub use memory::Memory;
pub use module_instance::{instantiate, instantiate_with_config, ModuleInstance, Store};
pub use stackless::StacklessEngine;
pub use table::Table;
pub use value::Value;
// Re-export error types for convenience
pub use wrt_error::{Error, Result};
