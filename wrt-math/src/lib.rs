// WRT - wrt-math
// Module: WebAssembly Numeric Semantics
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Mathematical operations and types for WRT.
//! Provides implementations for WebAssembly numeric instructions.
//!
//! Only operations whose WebAssembly semantics differ from plain Rust
//! arithmetic live here: trapping division and truncation, shift counts
//! taken modulo the bit width, sign-aware float min/max, ties-to-even
//! rounding and bitwise sign manipulation of floats.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![deny(clippy::todo, clippy::unimplemented)]
#![warn(clippy::pedantic)]
// Allow specific lints necessary for low-level math/Wasm ops, matching Cargo.toml
#![allow(clippy::float_arithmetic, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_precision_loss, clippy::missing_errors_doc)]

// Modules
pub mod float_bits;
pub mod ops;

pub use float_bits::{FloatBits32, FloatBits64};
pub use ops::*;
