// WRT - wrt-runtime
// Module: Stackless Engine
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Stackless WebAssembly execution engine
//!
//! This module implements a stackless version of the WebAssembly execution
//! engine that doesn't rely on the host language's call stack, making it
//! suitable for environments with limited stack space and for no_std contexts.

pub mod engine;
pub mod frame;
pub mod stack;

pub use engine::StacklessEngine;
pub use frame::{FrameKind, StacklessFrame};
pub use stack::OperandStack;
