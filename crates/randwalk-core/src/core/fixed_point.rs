//! Fixed-precision representation of real values.
//!
//! A real value `r` is stored as the integer `round(r * 2^bits)`, rounding to the nearest grid
//! point with ties resolved to even. Scaling by a power of two never touches the mantissa, so
//! the only lossy operation is the rounding itself, and it is the same on every code path.

use serde::{Deserialize, Serialize};

/// Widest supported fractional part. Leaves one integer bit plus the sign.
pub const MAX_FIXED_POINT_BITS: u32 = 62;

pub const DEFAULT_FIXED_POINT_BITS: u32 = 24;

// Exclusive upper bound of i64 as an exactly representable double.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

// Only called with exponents in `-62..=62`, well inside the normal range.
#[inline]
fn pow2(exponent: i32) -> f64 {
    debug_assert!((-1022..=1023).contains(&exponent));
    f64::from_bits(((1023 + exponent) as u64) << 52)
}

#[inline]
fn clamped_exponent(bits: u32) -> i32 {
    bits.min(MAX_FIXED_POINT_BITS) as i32
}

/// Converts `real` to fixed precision with `bits` fractional bits.
///
/// Results outside the `i64` range saturate and NaN maps to zero. Use [`checked_to_fixed`]
/// to detect either case. Widths above [`MAX_FIXED_POINT_BITS`] are clamped to it.
#[inline]
pub fn to_fixed(real: f64, bits: u32) -> i64 {
    (real * pow2(clamped_exponent(bits))).round_ties_even() as i64
}

/// Like [`to_fixed`], but `None` on overflow, NaN, or a width above [`MAX_FIXED_POINT_BITS`].
#[inline]
pub fn checked_to_fixed(real: f64, bits: u32) -> Option<i64> {
    if bits > MAX_FIXED_POINT_BITS {
        return None;
    }
    let scaled = (real * pow2(bits as i32)).round_ties_even();
    if scaled.is_finite() && (-I64_LIMIT..I64_LIMIT).contains(&scaled) {
        Some(scaled as i64)
    } else {
        None
    }
}

/// Widths above [`MAX_FIXED_POINT_BITS`] are clamped to it, matching [`to_fixed`].
#[inline]
pub fn to_real(fixed: i64, bits: u32) -> f64 {
    fixed as f64 * pow2(-clamped_exponent(bits))
}

/// Accumulates an increment. Saturates instead of wrapping at the ends of the `i64` range.
#[inline]
pub fn add(fixed: i64, delta: i64) -> i64 {
    fixed.saturating_add(delta)
}

/// A validated bit width together with its precomputed scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPointScale {
    bits: u32,
    scale: f64,
    inv_scale: f64,
}

impl FixedPointScale {
    /// Returns `None` when `bits` exceeds [`MAX_FIXED_POINT_BITS`].
    pub fn new(bits: u32) -> Option<Self> {
        (bits <= MAX_FIXED_POINT_BITS).then(|| Self {
            bits,
            scale: pow2(bits as i32),
            inv_scale: pow2(-(bits as i32)),
        })
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn inv_scale(&self) -> f64 {
        self.inv_scale
    }

    #[inline]
    pub fn to_fixed(&self, real: f64) -> i64 {
        to_fixed(real, self.bits)
    }

    #[inline]
    pub fn checked_to_fixed(&self, real: f64) -> Option<i64> {
        checked_to_fixed(real, self.bits)
    }

    #[inline]
    pub fn to_real(&self, fixed: i64) -> f64 {
        fixed as f64 * self.inv_scale
    }
}

impl Default for FixedPointScale {
    fn default() -> Self {
        Self {
            bits: DEFAULT_FIXED_POINT_BITS,
            scale: pow2(DEFAULT_FIXED_POINT_BITS as i32),
            inv_scale: pow2(-(DEFAULT_FIXED_POINT_BITS as i32)),
        }
    }
}
