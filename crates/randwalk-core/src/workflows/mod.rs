//! # Workflows Module
//!
//! High-level entry points that drive complete random-walk runs.
//!
//! ## Architecture
//!
//! - **Simulation Workflow** ([`simulate`]) - Builds one walk per requested execution policy,
//!   advances them in progress-reporting chunks, samples tracked particles before and after,
//!   and checks that every policy ended on the same arrays.

pub mod simulate;
