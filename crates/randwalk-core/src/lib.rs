//! # randwalk Core Library
//!
//! A deterministic two-dimensional random walk whose trajectories are reproducible to the bit,
//! whether the particles are advanced one at a time or spread across a thread pool.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that the numerical building blocks stay free of
//! any notion of scheduling.
//!
//! - **[`core`]: The Foundation.** Stateless pieces: the splittable Xoroshiro128+ stream
//!   (`random`), the fixed-precision conversions (`fixed_point`), the structure-of-arrays
//!   coordinate store (`models`) and diffusion statistics (`analysis`).
//!
//! - **[`engine`]: The Logic Core.** Owns the per-particle state (`RandomWalk`), the advance
//!   kernel, the interchangeable execution policies and the simulation configuration.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into complete runs,
//!   such as advancing the same configuration under several policies and comparing the results.

pub mod core;
pub mod engine;
pub mod workflows;
