// WRT - wrt-runtime
// Module: Linear Memory
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly linear memory.
//!
//! The backing buffer is always a whole number of 64 KiB pages. Memory only
//! grows; new pages are zero-filled and existing bytes are preserved.

use alloc::{vec, vec::Vec};

use tracing::trace;
use wrt_error::{codes, kinds, Error, Result};
use wrt_format::{
    binary::{MAX_PAGES, PAGE_SIZE},
    types::MemoryType,
};

/// A linear memory instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    /// The declared type; `limits.min` stays the initial size
    pub ty: MemoryType,
    data:   Vec<u8>,
}

impl Memory {
    /// Creates a new memory of `ty.limits.min` zeroed pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial size exceeds the 65536-page cap.
    pub fn new(ty: MemoryType) -> Result<Self> {
        if ty.limits.min > MAX_PAGES {
            return Err(Error::resource_error(codes::LIMIT_EXCEEDED, "Memory exceeds 65536 pages"));
        }
        Ok(Self { ty, data: vec![0; ty.limits.min as usize * PAGE_SIZE] })
    }

    /// Current size in pages
    pub fn size(&self) -> u32 {
        (self.data.len() / PAGE_SIZE) as u32
    }

    /// Current size in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.data.len()
    }

    /// The whole buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Grows memory by the given number of pages
    ///
    /// # Returns
    ///
    /// The previous number of pages if successful
    ///
    /// # Errors
    ///
    /// Returns a resource error, leaving the memory untouched, if the new
    /// size would exceed the declared maximum or the 65536-page cap.
    pub fn grow(&mut self, pages: u32) -> Result<u32> {
        let old_pages = self.size();
        if pages == 0 {
            return Ok(old_pages);
        }

        let new_pages = old_pages
            .checked_add(pages)
            .filter(|&n| n <= MAX_PAGES && self.ty.limits.max.is_none_or(|max| n <= max))
            .ok_or(Error::resource_error(codes::LIMIT_EXCEEDED, "Memory limit exceeded"))?;

        self.data.resize(new_pages as usize * PAGE_SIZE, 0);
        trace!(old_pages, new_pages, "memory grown");
        Ok(old_pages)
    }

    fn range(&self, address: u64, len: usize) -> Result<core::ops::Range<usize>> {
        let end = address.checked_add(len as u64);
        match end {
            Some(end) if end <= self.data.len() as u64 => Ok(address as usize..end as usize),
            _ => Err(kinds::memory_out_of_bounds(address, len as u64)),
        }
    }

    /// Read data from memory into a buffer
    ///
    /// # Errors
    ///
    /// Traps with `MEMORY_OUT_OF_BOUNDS` if any byte lies outside memory.
    pub fn read(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
        let range = self.range(address, buffer.len())?;
        buffer.copy_from_slice(&self.data[range]);
        Ok(())
    }

    /// Write data from a buffer into memory
    ///
    /// # Errors
    ///
    /// Traps with `MEMORY_OUT_OF_BOUNDS` if any byte lies outside memory;
    /// nothing is written in that case.
    pub fn write(&mut self, address: u64, buffer: &[u8]) -> Result<()> {
        let range = self.range(address, buffer.len())?;
        self.data[range].copy_from_slice(buffer);
        Ok(())
    }

    /// Bounds-checked fixed-width load.
    pub fn load<const N: usize>(&self, address: u64) -> Result<[u8; N]> {
        let mut bytes = [0; N];
        self.read(address, &mut bytes)?;
        Ok(bytes)
    }

    /// Read a little-endian `i32`
    pub fn read_i32(&self, address: u64) -> Result<i32> {
        self.load::<4>(address).map(i32::from_le_bytes)
    }

    /// Read a little-endian `i64`
    pub fn read_i64(&self, address: u64) -> Result<i64> {
        self.load::<8>(address).map(i64::from_le_bytes)
    }

    /// Write a little-endian `i32`
    pub fn write_i32(&mut self, address: u64, value: i32) -> Result<()> {
        self.write(address, &value.to_le_bytes())
    }

    /// Write a little-endian `i64`
    pub fn write_i64(&mut self, address: u64, value: i64) -> Result<()> {
        self.write(address, &value.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use wrt_format::types::Limits;

    use super::*;

    fn memory(min: u32, max: Option<u32>) -> Memory {
        Memory::new(MemoryType { limits: Limits::new(min, max) }).unwrap()
    }

    #[test]
    fn test_grow_preserves_and_zero_fills() {
        let mut mem = memory(1, None);
        mem.write_i32(PAGE_SIZE as u64 - 4, 0x1234_5678).unwrap();

        assert_eq!(mem.grow(2).unwrap(), 1);
        assert_eq!(mem.size(), 3);
        assert_eq!(mem.read_i32(PAGE_SIZE as u64 - 4).unwrap(), 0x1234_5678);
        assert!(mem.data()[PAGE_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_grow_respects_maximum() {
        let mut mem = memory(1, Some(2));
        assert_eq!(mem.grow(1).unwrap(), 1);
        let error = mem.grow(1).unwrap_err();
        assert!(error.is_resource_error());
        assert_eq!(mem.size(), 2);
        assert_eq!(mem.grow(0).unwrap(), 2);
        assert!(memory(0, None).grow(MAX_PAGES + 1).is_err());
    }

    #[test]
    fn test_out_of_bounds_access_traps() {
        let mut mem = memory(1, None);
        let last = PAGE_SIZE as u64 - 8;
        mem.write_i64(last, -2).unwrap();
        assert_eq!(mem.read_i64(last).unwrap(), -2);

        let error = mem.read_i64(last + 1).unwrap_err();
        assert_eq!(error.code, codes::MEMORY_OUT_OF_BOUNDS);
        assert!(error.is_trap());
        assert!(mem.write(u64::MAX, &[1]).is_err());
        assert!(memory(0, None).load::<1>(0).is_err());
    }
}
