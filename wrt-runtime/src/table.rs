// WRT - wrt-runtime
// Module: Table Instances
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly table implementation.
//!
//! A table holds function references as indices into the owning instance's
//! function index space. Slots start empty.

use alloc::{vec, vec::Vec};

use wrt_error::{codes, kinds, Error, Result};
use wrt_format::{binary::MAX_TABLE_ELEMENTS, types::TableType};

const TABLE_TOO_LARGE: Error =
    Error::resource_error(codes::LIMIT_EXCEEDED, "Table exceeds the element limit");

/// A WebAssembly table is a vector of opaque values of a single type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// The table type; `limits.min` stays the initial size
    pub ty:   TableType,
    elements: Vec<Option<u32>>,
}

impl Table {
    /// Creates a new table of `ty.limits.min` empty slots.
    ///
    /// # Errors
    ///
    /// Returns `LIMIT_EXCEEDED` if the initial size is above
    /// [`MAX_TABLE_ELEMENTS`].
    pub fn new(ty: TableType) -> Result<Self> {
        if ty.limits.min > MAX_TABLE_ELEMENTS {
            return Err(TABLE_TOO_LARGE);
        }
        Ok(Self { ty, elements: vec![None; ty.limits.min as usize] })
    }

    /// Gets the size of the table
    pub fn size(&self) -> u32 {
        self.elements.len() as u32
    }

    /// Gets an element from the table
    ///
    /// # Returns
    ///
    /// The function index at the given slot, or `None` if it was never set
    ///
    /// # Errors
    ///
    /// Traps with `TABLE_OUT_OF_BOUNDS` if `idx` is past the end
    pub fn get(&self, idx: u32) -> Result<Option<u32>> {
        self.elements.get(idx as usize).copied().ok_or(kinds::table_out_of_bounds(idx))
    }

    /// Sets an element in the table
    pub fn set(&mut self, idx: u32, value: Option<u32>) -> Result<()> {
        let slot = self.elements.get_mut(idx as usize).ok_or(kinds::table_out_of_bounds(idx))?;
        *slot = value;
        Ok(())
    }

    /// Copy `init` into consecutive slots starting at `offset`.
    ///
    /// Either every slot is written or, if the range does not fit, none is.
    pub fn init(&mut self, offset: u32, init: &[u32]) -> Result<()> {
        let start = offset as usize;
        let slots = start
            .checked_add(init.len())
            .and_then(|end| self.elements.get_mut(start..end))
            .ok_or(kinds::table_out_of_bounds(offset))?;
        for (slot, &func_idx) in slots.iter_mut().zip(init) {
            *slot = Some(func_idx);
        }
        Ok(())
    }

    /// Grows the table by `delta` slots filled with `init`
    ///
    /// # Returns
    ///
    /// The previous size of the table
    ///
    /// # Errors
    ///
    /// Returns a resource error if the declared maximum or
    /// [`MAX_TABLE_ELEMENTS`] would be exceeded
    pub fn grow(&mut self, delta: u32, init: Option<u32>) -> Result<u32> {
        let old_size = self.size();
        let new_size = old_size
            .checked_add(delta)
            .filter(|&n| self.ty.limits.max.is_none_or(|max| n <= max))
            .ok_or(Error::resource_error(codes::LIMIT_EXCEEDED, "Table grow exceeds maximum limit"))?;
        if new_size > MAX_TABLE_ELEMENTS {
            return Err(TABLE_TOO_LARGE);
        }
        self.elements.resize(new_size as usize, init);
        Ok(old_size)
    }
}
