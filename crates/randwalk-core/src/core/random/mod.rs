//! Pseudo-random number generation for reproducible simulations.
//!
//! Every particle owns one [`Xoroshiro128pState`]. States are carved out of a single seeded
//! stream with [`Xoroshiro128pGenerator::jump`], so no two particles ever draw from overlapping
//! segments of the orbit. The mappings from raw 64-bit outputs to real numbers are plain
//! functions shared by every execution policy.

pub mod xoroshiro;

pub use xoroshiro::{
    DEFAULT_SCRUB_CYCLES, Xoroshiro128pGenerator, Xoroshiro128pState, splitmix64, stream_states,
};

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

/// Largest magnitude [`box_muller`] can return for uniforms drawn on the 2^-53 grid.
///
/// `sqrt(-2 ln(2^-53))` is about 8.5718.
pub const GAUSSIAN_MAGNITUDE_BOUND: f64 = 8.58;

/// Largest magnitude of a centered uniform step, `|0.5 - u|` for `u` in [0, 1).
pub const UNIFORM_MAGNITUDE_BOUND: f64 = 0.5;

const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// The distribution each random-walk step is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomNumberKind {
    Uniform,
    #[default]
    Gaussian,
}

impl RandomNumberKind {
    /// Upper bound on the magnitude of one step before scaling by the fluctuation.
    pub fn magnitude_bound(self) -> f64 {
        match self {
            RandomNumberKind::Uniform => UNIFORM_MAGNITUDE_BOUND,
            RandomNumberKind::Gaussian => GAUSSIAN_MAGNITUDE_BOUND,
        }
    }
}

impl fmt::Display for RandomNumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomNumberKind::Uniform => write!(f, "uniform"),
            RandomNumberKind::Gaussian => write!(f, "gaussian"),
        }
    }
}

/// Maps a raw output onto [0, 1) using its top 53 bits, the full double mantissa.
#[inline]
pub fn unit_uniform(raw: u64) -> f64 {
    (raw >> 11) as f64 * UNIT_SCALE
}

/// Box-Muller transform, cosine branch.
///
/// `u1` is taken from [0, 1) and reflected to (0, 1] so the logarithm stays finite.
#[inline]
pub fn box_muller(u1: f64, u2: f64) -> f64 {
    (-2.0 * (1.0 - u1).ln()).sqrt() * (TAU * u2).cos()
}
