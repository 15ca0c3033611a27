// WRT - wrt-runtime
// Module: Function Instances
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Function instances.

use alloc::{sync::Arc, vec::Vec};
use core::fmt;

use wrt_error::Result;
use wrt_format::{module::Code, types::FuncType};

use crate::value::Value;

/// Host callback: takes the arguments in declaration order and returns the
/// results in declaration order. An `Err` traps the calling invocation.
pub type HostFunc = Arc<dyn Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync>;

/// A function in an instance's function index space.
#[derive(Clone)]
pub enum Function {
    /// Defined by the module itself
    Internal {
        /// Signature
        ty:   FuncType,
        /// Locals and body
        code: Code,
    },
    /// Supplied by the embedder
    Host {
        /// Signature
        ty:       FuncType,
        /// Callback invoked synchronously by the engine
        callback: HostFunc,
    },
}

impl Function {
    /// Wrap a host closure as a function of type `ty`.
    pub fn host<F>(ty: FuncType, callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self::Host { ty, callback: Arc::new(callback) }
    }

    /// The function's signature.
    pub fn ty(&self) -> &FuncType {
        match self {
            Self::Internal { ty, .. } | Self::Host { ty, .. } => ty,
        }
    }

    /// True for embedder-supplied functions.
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host { .. })
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal { ty, code } => f
                .debug_struct("Internal")
                .field("ty", ty)
                .field("instructions", &code.body.len())
                .finish(),
            Self::Host { ty, .. } => f.debug_struct("Host").field("ty", ty).finish_non_exhaustive(),
        }
    }
}
