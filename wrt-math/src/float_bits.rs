// WRT - wrt-math
// Module: Float Bit Patterns
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Wrapper types for f32 and f64 ensuring bit-pattern based equality and
//! hashing.
//!
//! Operand stack cells hold floats as raw bits; these wrappers keep them in
//! that form so NaN payloads and the sign of zero survive unchanged.

/// Wrapper for f32 that implements Hash, `PartialEq`, and Eq based on bit
/// patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FloatBits32(pub u32);

impl FloatBits32 {
    /// Canonical quiet `NaN`
    pub const NAN: Self = FloatBits32(0x7fc0_0000);
    const SIGN: u32 = 0x8000_0000;

    /// Creates a new `FloatBits32` from an `f32` value.
    #[must_use]
    pub fn from_float(val: f32) -> Self {
        Self(val.to_bits())
    }

    /// Returns the `f32` value represented by this `FloatBits32`.
    #[must_use]
    pub fn value(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// Returns the underlying `u32` bits of this `FloatBits32`.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Creates a `FloatBits32` from raw `u32` bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Clear the sign bit
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0 & !Self::SIGN)
    }

    /// Flip the sign bit
    #[must_use]
    pub const fn neg(self) -> Self {
        Self(self.0 ^ Self::SIGN)
    }

    /// Magnitude of `self` with the sign of `sign`
    #[must_use]
    pub const fn copysign(self, sign: Self) -> Self {
        Self((self.0 & !Self::SIGN) | (sign.0 & Self::SIGN))
    }
}

/// Wrapper for f64 that implements Hash, `PartialEq`, and Eq based on bit
/// patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FloatBits64(pub u64);

impl FloatBits64 {
    /// Canonical quiet `NaN`
    pub const NAN: Self = FloatBits64(0x7ff8_0000_0000_0000);
    const SIGN: u64 = 0x8000_0000_0000_0000;

    /// Creates a new `FloatBits64` from an `f64` value.
    #[must_use]
    pub fn from_float(val: f64) -> Self {
        Self(val.to_bits())
    }

    /// Returns the `f64` value represented by this `FloatBits64`.
    #[must_use]
    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// Returns the underlying `u64` bits of this `FloatBits64`.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Creates a `FloatBits64` from raw `u64` bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Clear the sign bit
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0 & !Self::SIGN)
    }

    /// Flip the sign bit
    #[must_use]
    pub const fn neg(self) -> Self {
        Self(self.0 ^ Self::SIGN)
    }

    /// Magnitude of `self` with the sign of `sign`
    #[must_use]
    pub const fn copysign(self, sign: Self) -> Self {
        Self((self.0 & !Self::SIGN) | (sign.0 & Self::SIGN))
    }
}
