// WRT - wrt-error
// Module: WRT Error Handling
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WRT Error handling library
//!
//! A single, `Copy`-able error type shared by the decoder and the runtime.
//! Every error carries a category, a numeric code, a static message, and an
//! optional [`ErrorContext`] that pinpoints the offending input.
//!
//! # Error Categories
//!
//! ## Parse Errors (1000-1099)
//! - Malformed magic or version
//! - Out-of-order, duplicate or mis-sized sections
//! - Unknown value types, block types, mutability flags, descriptor tags
//! - Truncated or overlong LEB128 integers
//! - Badly terminated expressions, non-zero reserved bytes
//!
//! ## Traps (2000-2099)
//! - Out-of-bounds memory or table access
//! - Indirect call signature mismatch, uninitialized table slots
//! - Integer division by zero, integer overflow, invalid conversion
//! - `unreachable`, call stack exhaustion, host function failure
//!
//! ## Initialization Errors (3000-3099)
//! - Unresolved or mistyped imports
//! - Out-of-bounds element or data segments
//!
//! ## Runtime API Errors (4000-4099)
//! - Unknown exports, wrong argument lists, exhausted limits
//!
//! # Usage
//!
//! ```
//! use wrt_error::{codes, Error, ErrorCategory, ErrorContext};
//!
//! let error = Error::parse_error(codes::INVALID_VALUE_TYPE, "Malformed value type")
//!     .with_context(ErrorContext::Byte { field: "value type", value: 0x40 });
//!
//! assert_eq!(error.category, ErrorCategory::Parse);
//! assert!(error.is_parse_error());
//! assert!(!error.is_trap());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)] // Rule 2
#![deny(clippy::all)]
#![deny(clippy::perf)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Error codes for wrt
pub mod codes;
/// Localising detail attached to errors
pub mod context;
/// Error and error handling types
pub mod errors;
/// Constructors for frequently raised errors
pub mod kinds;

pub use context::ErrorContext;
pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for WRT operations.
///
/// This type alias uses `wrt_error::Error` as the error type.
pub type Result<T> = core::result::Result<T, Error>;
