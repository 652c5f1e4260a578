use thiserror::Error;

use super::config::ConfigError;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Index {index} is invalid for a series of {count} particles")]
    IndexOutOfRange { index: usize, count: usize },

    #[error(
        "Advancing {steps} steps could overflow the fixed-point range (bits = {bits}, fluctuation = {fluctuation})"
    )]
    CapacityExceeded {
        steps: u64,
        bits: u32,
        fluctuation: f64,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
