// WRT - wrt-math
// Module: Numeric Operations
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Numeric operations with WebAssembly semantics.
//!
//! Integer operands arrive in the signedness the instruction interprets them
//! with; callers reinterpret the raw `i32`/`i64` cell as needed.

use wrt_error::{Error, Result};

use crate::float_bits::{FloatBits32, FloatBits64};

// --- Integer division -------------------------------------------------------

/// `i32.div_s`: traps on a zero divisor and on `i32::MIN / -1`.
pub fn i32_div_s(lhs: i32, rhs: i32) -> Result<i32> {
    if rhs == 0 {
        return Err(Error::DIVISION_BY_ZERO);
    }
    lhs.checked_div(rhs).ok_or(Error::INTEGER_OVERFLOW)
}

/// `i32.div_u`
pub fn i32_div_u(lhs: u32, rhs: u32) -> Result<u32> {
    lhs.checked_div(rhs).ok_or(Error::DIVISION_BY_ZERO)
}

/// `i32.rem_s`: `i32::MIN % -1` is 0, only a zero divisor traps.
pub fn i32_rem_s(lhs: i32, rhs: i32) -> Result<i32> {
    if rhs == 0 {
        return Err(Error::DIVISION_BY_ZERO);
    }
    Ok(lhs.wrapping_rem(rhs))
}

/// `i32.rem_u`
pub fn i32_rem_u(lhs: u32, rhs: u32) -> Result<u32> {
    lhs.checked_rem(rhs).ok_or(Error::DIVISION_BY_ZERO)
}

/// `i64.div_s`: traps on a zero divisor and on `i64::MIN / -1`.
pub fn i64_div_s(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(Error::DIVISION_BY_ZERO);
    }
    lhs.checked_div(rhs).ok_or(Error::INTEGER_OVERFLOW)
}

/// `i64.div_u`
pub fn i64_div_u(lhs: u64, rhs: u64) -> Result<u64> {
    lhs.checked_div(rhs).ok_or(Error::DIVISION_BY_ZERO)
}

/// `i64.rem_s`: `i64::MIN % -1` is 0, only a zero divisor traps.
pub fn i64_rem_s(lhs: i64, rhs: i64) -> Result<i64> {
    if rhs == 0 {
        return Err(Error::DIVISION_BY_ZERO);
    }
    Ok(lhs.wrapping_rem(rhs))
}

/// `i64.rem_u`
pub fn i64_rem_u(lhs: u64, rhs: u64) -> Result<u64> {
    lhs.checked_rem(rhs).ok_or(Error::DIVISION_BY_ZERO)
}

// --- Shifts and rotates -----------------------------------------------------
// The shift count is taken modulo the operand width.

/// `i32.shl`
#[must_use]
pub fn i32_shl(lhs: i32, rhs: i32) -> i32 {
    lhs.wrapping_shl(rhs as u32 % 32)
}

/// `i32.shr_s`
#[must_use]
pub fn i32_shr_s(lhs: i32, rhs: i32) -> i32 {
    lhs.wrapping_shr(rhs as u32 % 32)
}

/// `i32.shr_u`
#[must_use]
pub fn i32_shr_u(lhs: i32, rhs: i32) -> i32 {
    (lhs as u32).wrapping_shr(rhs as u32 % 32) as i32
}

/// `i32.rotl`
#[must_use]
pub fn i32_rotl(lhs: i32, rhs: i32) -> i32 {
    lhs.rotate_left(rhs as u32 % 32)
}

/// `i32.rotr`
#[must_use]
pub fn i32_rotr(lhs: i32, rhs: i32) -> i32 {
    lhs.rotate_right(rhs as u32 % 32)
}

/// `i64.shl`
#[must_use]
pub fn i64_shl(lhs: i64, rhs: i64) -> i64 {
    lhs.wrapping_shl((rhs as u64 % 64) as u32)
}

/// `i64.shr_s`
#[must_use]
pub fn i64_shr_s(lhs: i64, rhs: i64) -> i64 {
    lhs.wrapping_shr((rhs as u64 % 64) as u32)
}

/// `i64.shr_u`
#[must_use]
pub fn i64_shr_u(lhs: i64, rhs: i64) -> i64 {
    (lhs as u64).wrapping_shr((rhs as u64 % 64) as u32) as i64
}

/// `i64.rotl`
#[must_use]
pub fn i64_rotl(lhs: i64, rhs: i64) -> i64 {
    lhs.rotate_left((rhs as u64 % 64) as u32)
}

/// `i64.rotr`
#[must_use]
pub fn i64_rotr(lhs: i64, rhs: i64) -> i64 {
    lhs.rotate_right((rhs as u64 % 64) as u32)
}

// --- Sign extension ---------------------------------------------------------

/// `i32.extend8_s`
#[must_use]
pub fn i32_extend8_s(val: i32) -> i32 {
    i32::from(val as i8)
}

/// `i32.extend16_s`
#[must_use]
pub fn i32_extend16_s(val: i32) -> i32 {
    i32::from(val as i16)
}

/// `i64.extend8_s`
#[must_use]
pub fn i64_extend8_s(val: i64) -> i64 {
    i64::from(val as i8)
}

/// `i64.extend16_s`
#[must_use]
pub fn i64_extend16_s(val: i64) -> i64 {
    i64::from(val as i16)
}

/// `i64.extend32_s`
#[must_use]
pub fn i64_extend32_s(val: i64) -> i64 {
    i64::from(val as i32)
}

// --- Float operations -------------------------------------------------------

/// `f32.abs`, a pure bit operation that leaves NaN payloads intact.
#[must_use]
pub fn wasm_f32_abs(val: FloatBits32) -> FloatBits32 {
    val.abs()
}

/// `f32.neg`
#[must_use]
pub fn wasm_f32_neg(val: FloatBits32) -> FloatBits32 {
    val.neg()
}

/// `f32.copysign`
#[must_use]
pub fn wasm_f32_copysign(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    lhs.copysign(rhs)
}

/// `f32.ceil`
#[must_use]
pub fn wasm_f32_ceil(val: f32) -> f32 {
    libm::ceilf(val)
}

/// `f32.floor`
#[must_use]
pub fn wasm_f32_floor(val: f32) -> f32 {
    libm::floorf(val)
}

/// `f32.trunc`
#[must_use]
pub fn wasm_f32_trunc(val: f32) -> f32 {
    libm::truncf(val)
}

/// `f32.nearest`: round to the nearest integer, ties to even.
#[must_use]
pub fn wasm_f32_nearest(val: f32) -> f32 {
    libm::rintf(val)
}

/// `f32.sqrt`
#[must_use]
pub fn wasm_f32_sqrt(val: f32) -> f32 {
    libm::sqrtf(val)
}

/// `f32.min`: NaN if either operand is NaN, and `-0.0` orders below `+0.0`.
#[must_use]
pub fn wasm_f32_min(lhs: f32, rhs: f32) -> f32 {
    if lhs.is_nan() || rhs.is_nan() {
        return FloatBits32::NAN.value();
    }
    if lhs == rhs {
        // Equal operands differ at most in the sign of zero
        return f32::from_bits(lhs.to_bits() | rhs.to_bits());
    }
    if lhs < rhs { lhs } else { rhs }
}

/// `f32.max`: NaN if either operand is NaN, and `+0.0` orders above `-0.0`.
#[must_use]
pub fn wasm_f32_max(lhs: f32, rhs: f32) -> f32 {
    if lhs.is_nan() || rhs.is_nan() {
        return FloatBits32::NAN.value();
    }
    if lhs == rhs {
        return f32::from_bits(lhs.to_bits() & rhs.to_bits());
    }
    if lhs > rhs { lhs } else { rhs }
}

/// `f64.abs`
#[must_use]
pub fn wasm_f64_abs(val: FloatBits64) -> FloatBits64 {
    val.abs()
}

/// `f64.neg`
#[must_use]
pub fn wasm_f64_neg(val: FloatBits64) -> FloatBits64 {
    val.neg()
}

/// `f64.copysign`
#[must_use]
pub fn wasm_f64_copysign(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    lhs.copysign(rhs)
}

/// `f64.ceil`
#[must_use]
pub fn wasm_f64_ceil(val: f64) -> f64 {
    libm::ceil(val)
}

/// `f64.floor`
#[must_use]
pub fn wasm_f64_floor(val: f64) -> f64 {
    libm::floor(val)
}

/// `f64.trunc`
#[must_use]
pub fn wasm_f64_trunc(val: f64) -> f64 {
    libm::trunc(val)
}

/// `f64.nearest`: round to the nearest integer, ties to even.
#[must_use]
pub fn wasm_f64_nearest(val: f64) -> f64 {
    libm::rint(val)
}

/// `f64.sqrt`
#[must_use]
pub fn wasm_f64_sqrt(val: f64) -> f64 {
    libm::sqrt(val)
}

/// `f64.min`
#[must_use]
pub fn wasm_f64_min(lhs: f64, rhs: f64) -> f64 {
    if lhs.is_nan() || rhs.is_nan() {
        return FloatBits64::NAN.value();
    }
    if lhs == rhs {
        return f64::from_bits(lhs.to_bits() | rhs.to_bits());
    }
    if lhs < rhs { lhs } else { rhs }
}

/// `f64.max`
#[must_use]
pub fn wasm_f64_max(lhs: f64, rhs: f64) -> f64 {
    if lhs.is_nan() || rhs.is_nan() {
        return FloatBits64::NAN.value();
    }
    if lhs == rhs {
        return f64::from_bits(lhs.to_bits() & rhs.to_bits());
    }
    if lhs > rhs { lhs } else { rhs }
}

// --- Trapping truncation ----------------------------------------------------
// NaN traps with INVALID_CONVERSION; a truncated value outside the target
// range traps with INTEGER_OVERFLOW. Bounds are exact powers of two, which
// every float width represents exactly.

fn truncate(val: f64, is_nan: bool, lower_exclusive: f64, upper_exclusive: f64) -> Result<f64> {
    if is_nan {
        return Err(Error::INVALID_CONVERSION);
    }
    let truncated = libm::trunc(val);
    if truncated > lower_exclusive && truncated < upper_exclusive {
        Ok(truncated)
    } else {
        Err(Error::INTEGER_OVERFLOW)
    }
}

const I32_LOWER: f64 = -2_147_483_649.0;
const I32_UPPER: f64 = 2_147_483_648.0;
const U32_UPPER: f64 = 4_294_967_296.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;
const U64_UPPER: f64 = 18_446_744_073_709_551_616.0;

/// `i32.trunc_f32_s`
pub fn i32_trunc_f32_s(val: f32) -> Result<i32> {
    truncate(f64::from(val), val.is_nan(), I32_LOWER, I32_UPPER).map(|t| t as i32)
}

/// `i32.trunc_f32_u`
pub fn i32_trunc_f32_u(val: f32) -> Result<u32> {
    truncate(f64::from(val), val.is_nan(), -1.0, U32_UPPER).map(|t| t as u32)
}

/// `i32.trunc_f64_s`
pub fn i32_trunc_f64_s(val: f64) -> Result<i32> {
    truncate(val, val.is_nan(), I32_LOWER, I32_UPPER).map(|t| t as i32)
}

/// `i32.trunc_f64_u`
pub fn i32_trunc_f64_u(val: f64) -> Result<u32> {
    truncate(val, val.is_nan(), -1.0, U32_UPPER).map(|t| t as u32)
}

/// `i64.trunc_f32_s`
pub fn i64_trunc_f32_s(val: f32) -> Result<i64> {
    i64_trunc_f64_s(f64::from(val))
}

/// `i64.trunc_f32_u`
pub fn i64_trunc_f32_u(val: f32) -> Result<u64> {
    i64_trunc_f64_u(f64::from(val))
}

/// `i64.trunc_f64_s`
pub fn i64_trunc_f64_s(val: f64) -> Result<i64> {
    if val.is_nan() {
        return Err(Error::INVALID_CONVERSION);
    }
    let truncated = libm::trunc(val);
    // i64::MIN is exactly representable, unlike the value just below it
    if truncated >= -I64_UPPER && truncated < I64_UPPER {
        Ok(truncated as i64)
    } else {
        Err(Error::INTEGER_OVERFLOW)
    }
}

/// `i64.trunc_f64_u`
pub fn i64_trunc_f64_u(val: f64) -> Result<u64> {
    truncate(val, val.is_nan(), -1.0, U64_UPPER).map(|t| t as u64)
}

// --- Saturating truncation --------------------------------------------------
// Out-of-range values clamp to the target bounds and NaN becomes 0.

/// `i32.trunc_sat_f32_s`
#[must_use]
pub fn i32_trunc_sat_f32_s(val: f32) -> i32 {
    val as i32
}

/// `i32.trunc_sat_f32_u`
#[must_use]
pub fn i32_trunc_sat_f32_u(val: f32) -> u32 {
    val as u32
}

/// `i32.trunc_sat_f64_s`
#[must_use]
pub fn i32_trunc_sat_f64_s(val: f64) -> i32 {
    val as i32
}

/// `i32.trunc_sat_f64_u`
#[must_use]
pub fn i32_trunc_sat_f64_u(val: f64) -> u32 {
    val as u32
}

/// `i64.trunc_sat_f32_s`
#[must_use]
pub fn i64_trunc_sat_f32_s(val: f32) -> i64 {
    val as i64
}

/// `i64.trunc_sat_f32_u`
#[must_use]
pub fn i64_trunc_sat_f32_u(val: f32) -> u64 {
    val as u64
}

/// `i64.trunc_sat_f64_s`
#[must_use]
pub fn i64_trunc_sat_f64_s(val: f64) -> i64 {
    val as i64
}

/// `i64.trunc_sat_f64_u`
#[must_use]
pub fn i64_trunc_sat_f64_u(val: f64) -> u64 {
    val as u64
}

#[cfg(test)]
mod tests {
    use wrt_error::codes;

    use super::*;

    #[test]
    fn test_signed_division_traps() {
        assert_eq!(i32_div_s(7, -2).unwrap(), -3);
        assert_eq!(i32_div_s(1, 0).unwrap_err().code, codes::DIVISION_BY_ZERO);
        assert_eq!(i32_div_s(i32::MIN, -1).unwrap_err().code, codes::INTEGER_OVERFLOW);
        assert_eq!(i64_div_s(i64::MIN, -1).unwrap_err().code, codes::INTEGER_OVERFLOW);
        assert_eq!(i64_div_u(1, 0).unwrap_err().code, codes::DIVISION_BY_ZERO);
    }

    #[test]
    fn test_signed_remainder_of_min_is_zero() {
        assert_eq!(i32_rem_s(i32::MIN, -1).unwrap(), 0);
        assert_eq!(i64_rem_s(i64::MIN, -1).unwrap(), 0);
        assert_eq!(i32_rem_s(-7, 2).unwrap(), -1);
        assert_eq!(i32_rem_u(7, 0).unwrap_err().code, codes::DIVISION_BY_ZERO);
    }

    #[test]
    fn test_shift_counts_wrap() {
        assert_eq!(i32_shl(1, 33), 2);
        assert_eq!(i32_shr_s(-8, 1), -4);
        assert_eq!(i32_shr_u(-8, 1), 0x7FFF_FFFC);
        assert_eq!(i32_rotl(i32::MIN, 1), 1);
        assert_eq!(i32_rotr(1, -1), 2);
        assert_eq!(i64_shl(1, 65), 2);
        assert_eq!(i64_shr_u(-1, 63), 1);
        assert_eq!(i64_rotl(1, 64), 1);
    }

    #[test]
    fn test_sign_extension() {
        assert_eq!(i32_extend8_s(0x80), -128);
        assert_eq!(i32_extend16_s(0x7FFF), 0x7FFF);
        assert_eq!(i64_extend32_s(0x8000_0000), -2_147_483_648);
        assert_eq!(i64_extend16_s(0xFFFF), -1);
    }

    #[test]
    fn test_min_max_zero_and_nan() {
        assert!(wasm_f32_min(-0.0, 0.0).is_sign_negative());
        assert!(wasm_f32_max(-0.0, 0.0).is_sign_positive());
        assert!(wasm_f64_min(0.0, -0.0).is_sign_negative());
        assert!(wasm_f64_max(f64::NAN, 1.0).is_nan());
        assert!(wasm_f32_min(1.0, f32::NAN).is_nan());
        assert_eq!(wasm_f64_max(1.0, 2.0), 2.0);
    }

    #[test]
    fn test_nearest_ties_to_even() {
        assert_eq!(wasm_f32_nearest(2.5), 2.0);
        assert_eq!(wasm_f32_nearest(3.5), 4.0);
        assert_eq!(wasm_f64_nearest(-0.5), -0.0);
        assert!(wasm_f64_nearest(-0.5).is_sign_negative());
        assert_eq!(wasm_f64_floor(-1.5), -2.0);
        assert_eq!(wasm_f32_ceil(1.1), 2.0);
        assert_eq!(wasm_f64_sqrt(16.0), 4.0);
    }

    #[test]
    fn test_trapping_truncation() {
        assert_eq!(i32_trunc_f32_s(-2_147_483_648.0).unwrap(), i32::MIN);
        assert_eq!(i32_trunc_f32_s(2_147_483_648.0).unwrap_err().code, codes::INTEGER_OVERFLOW);
        assert_eq!(i32_trunc_f64_s(-2_147_483_648.9).unwrap(), i32::MIN);
        assert_eq!(i32_trunc_f64_s(-2_147_483_649.0).unwrap_err().code, codes::INTEGER_OVERFLOW);
        assert_eq!(i32_trunc_f64_u(-0.9).unwrap(), 0);
        assert_eq!(i32_trunc_f64_u(-1.0).unwrap_err().code, codes::INTEGER_OVERFLOW);
        assert_eq!(i32_trunc_f32_u(f32::NAN).unwrap_err().code, codes::INVALID_CONVERSION);
        assert_eq!(i64_trunc_f64_s(-9_223_372_036_854_775_808.0).unwrap(), i64::MIN);
        assert_eq!(i64_trunc_f64_s(9_223_372_036_854_775_808.0).unwrap_err().code, codes::INTEGER_OVERFLOW);
        assert_eq!(i64_trunc_f64_u(18_446_744_073_709_549_568.0).unwrap(), 18_446_744_073_709_549_568);
        assert_eq!(i64_trunc_f32_u(f32::INFINITY).unwrap_err().code, codes::INTEGER_OVERFLOW);
    }

    #[test]
    fn test_saturating_truncation() {
        assert_eq!(i32_trunc_sat_f32_s(f32::NAN), 0);
        assert_eq!(i32_trunc_sat_f64_s(1e10), i32::MAX);
        assert_eq!(i32_trunc_sat_f64_u(-5.0), 0);
        assert_eq!(i64_trunc_sat_f32_s(f32::NEG_INFINITY), i64::MIN);
        assert_eq!(i64_trunc_sat_f64_u(f64::INFINITY), u64::MAX);
    }
}
