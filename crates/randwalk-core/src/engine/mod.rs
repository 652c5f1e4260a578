//! # Engine Module
//!
//! The stateful layer of the random walk. It owns the per-particle coordinate and stream
//! arrays and drives them forward under an interchangeable execution policy.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Particle count, precision, seed and step distribution
//! - **Simulation State** ([`walk`]) - The `RandomWalk` object and its borrow-checked views
//! - **Advance Kernel** ([`kernel`]) - The per-particle extract/step/reinsert loop
//! - **Execution Policies** ([`policy`]) - Sequential or data-parallel dispatch of particles
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long advances
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Reproducibility
//!
//! Particles never read each other's state, every step draws x before y, and every increment is
//! rounded to the nearest fixed-point grid point with ties to even. Under those rules the order
//! in which particles are dispatched cannot influence any result, so all policies produce the
//! same arrays to the bit.

pub mod config;
pub mod error;
pub mod kernel;
pub mod policy;
pub mod progress;
pub mod walk;
