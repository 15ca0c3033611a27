// WRT - wrt-runtime
// Module: Operand Stack
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Operand stack of untyped 64-bit cells.
//!
//! Each cell is reinterpreted according to the static type the current
//! instruction expects. Locals of the active calls live on this stack too,
//! directly above their caller's operands.

use alloc::vec::Vec;

use wrt_error::{Error, Result};
use wrt_math::{FloatBits32, FloatBits64};

/// Stack of raw value cells with a hard size limit.
#[derive(Debug, Clone, Default)]
pub struct OperandStack {
    cells: Vec<u64>,
    limit: usize,
}

impl OperandStack {
    /// An empty stack holding at most `limit` cells.
    pub fn new(limit: usize) -> Self {
        Self { cells: Vec::new(), limit }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cells are held
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Push a raw cell
    pub fn push(&mut self, cell: u64) -> Result<()> {
        if self.cells.len() >= self.limit {
            return Err(Error::STACK_OVERFLOW);
        }
        self.cells.push(cell);
        Ok(())
    }

    /// Pop a raw cell
    pub fn pop(&mut self) -> Result<u64> {
        self.cells.pop().ok_or(Error::STACK_UNDERFLOW)
    }

    /// Top cell without removing it
    pub fn peek(&self) -> Result<u64> {
        self.cells.last().copied().ok_or(Error::STACK_UNDERFLOW)
    }

    /// Cell at an absolute position
    pub fn get(&self, idx: usize) -> Result<u64> {
        self.cells.get(idx).copied().ok_or(Error::STACK_UNDERFLOW)
    }

    /// Overwrite the cell at an absolute position
    pub fn set(&mut self, idx: usize, cell: u64) -> Result<()> {
        let slot = self.cells.get_mut(idx).ok_or(Error::STACK_UNDERFLOW)?;
        *slot = cell;
        Ok(())
    }

    /// Push `count` zero cells.
    pub fn push_zeros(&mut self, count: usize) -> Result<()> {
        if count > self.limit.saturating_sub(self.cells.len()) {
            return Err(Error::STACK_OVERFLOW);
        }
        self.cells.resize(self.cells.len() + count, 0);
        Ok(())
    }

    /// Remove and return the top `count` cells, bottom-most first.
    pub fn pop_n(&mut self, count: usize) -> Result<Vec<u64>> {
        let at = self.cells.len().checked_sub(count).ok_or(Error::STACK_UNDERFLOW)?;
        Ok(self.cells.split_off(at))
    }

    /// Keep the top `keep` cells, discard everything between them and
    /// `base`, leaving the stack `base + keep` cells high.
    pub fn unwind(&mut self, base: usize, keep: usize) -> Result<()> {
        let len = self.cells.len();
        let kept_from = len.checked_sub(keep).filter(|&k| k >= base).ok_or(Error::STACK_UNDERFLOW)?;
        self.cells.drain(base..kept_from);
        Ok(())
    }

    /// Pop an i32
    pub fn pop_i32(&mut self) -> Result<i32> {
        self.pop().map(|cell| cell as u32 as i32)
    }

    /// Pop an i64
    pub fn pop_i64(&mut self) -> Result<i64> {
        self.pop().map(|cell| cell as i64)
    }

    /// Pop an f32
    pub fn pop_f32(&mut self) -> Result<f32> {
        self.pop_f32_bits().map(FloatBits32::value)
    }

    /// Pop an f64
    pub fn pop_f64(&mut self) -> Result<f64> {
        self.pop_f64_bits().map(FloatBits64::value)
    }

    /// Pop an f32 bit pattern
    pub fn pop_f32_bits(&mut self) -> Result<FloatBits32> {
        self.pop().map(|cell| FloatBits32(cell as u32))
    }

    /// Pop an f64 bit pattern
    pub fn pop_f64_bits(&mut self) -> Result<FloatBits64> {
        self.pop().map(FloatBits64)
    }

    /// Push an i32, zero-extended into the cell
    pub fn push_i32(&mut self, value: i32) -> Result<()> {
        self.push(u64::from(value as u32))
    }

    /// Push an i64
    pub fn push_i64(&mut self, value: i64) -> Result<()> {
        self.push(value as u64)
    }

    /// Push an f32
    pub fn push_f32(&mut self, value: f32) -> Result<()> {
        self.push(u64::from(value.to_bits()))
    }

    /// Push an f64
    pub fn push_f64(&mut self, value: f64) -> Result<()> {
        self.push(value.to_bits())
    }

    /// Push an f32 bit pattern
    pub fn push_f32_bits(&mut self, value: FloatBits32) -> Result<()> {
        self.push(u64::from(value.to_bits()))
    }

    /// Push an f64 bit pattern
    pub fn push_f64_bits(&mut self, value: FloatBits64) -> Result<()> {
        self.push(value.to_bits())
    }

    /// Push a comparison result as i32 0 or 1
    pub fn push_bool(&mut self, value: bool) -> Result<()> {
        self.push(u64::from(value))
    }
}
