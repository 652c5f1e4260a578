use crate::core::fixed_point::{DEFAULT_FIXED_POINT_BITS, MAX_FIXED_POINT_BITS};
use crate::core::random::RandomNumberKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 1083674;
pub const DEFAULT_FLUCTUATION: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Fixed-point bit width {bits} exceeds the supported maximum of {max}")]
    BitsOutOfRange { bits: u32, max: u32 },

    #[error("Fluctuation must be a finite number, got {0}")]
    NonFiniteFluctuation(f64),

    #[error("A run must take at least one step; the count includes the initial step")]
    ZeroSteps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub particle_count: u32,
    /// Fractional bits of the fixed-point coordinates.
    pub bits: u32,
    pub seed: u64,
    /// Scale applied to every drawn step before rounding.
    pub fluctuation: f64,
    pub style: RandomNumberKind,
    /// Independent replica of the same seed; each replica starts 2^96 outputs further along
    /// the base stream.
    pub replica: u32,
}

impl SimulationConfig {
    /// A configuration with every optional parameter at its default.
    pub fn new(particle_count: u32) -> Self {
        Self {
            particle_count,
            bits: DEFAULT_FIXED_POINT_BITS,
            seed: DEFAULT_SEED,
            fluctuation: DEFAULT_FLUCTUATION,
            style: RandomNumberKind::default(),
            replica: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bits > MAX_FIXED_POINT_BITS {
            return Err(ConfigError::BitsOutOfRange {
                bits: self.bits,
                max: MAX_FIXED_POINT_BITS,
            });
        }
        if !self.fluctuation.is_finite() {
            return Err(ConfigError::NonFiniteFluctuation(self.fluctuation));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    particle_count: Option<u32>,
    bits: Option<u32>,
    seed: Option<u64>,
    fluctuation: Option<f64>,
    style: Option<RandomNumberKind>,
    replica: Option<u32>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particle_count(mut self, count: u32) -> Self {
        self.particle_count = Some(count);
        self
    }
    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn fluctuation(mut self, fluctuation: f64) -> Self {
        self.fluctuation = Some(fluctuation);
        self
    }
    pub fn style(mut self, style: RandomNumberKind) -> Self {
        self.style = Some(style);
        self
    }
    pub fn replica(mut self, replica: u32) -> Self {
        self.replica = Some(replica);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            particle_count: self
                .particle_count
                .ok_or(ConfigError::MissingParameter("particle_count"))?,
            bits: self.bits.unwrap_or(DEFAULT_FIXED_POINT_BITS),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            fluctuation: self.fluctuation.unwrap_or(DEFAULT_FLUCTUATION),
            style: self.style.unwrap_or_default(),
            replica: self.replica.unwrap_or(0),
        };
        config.validate()?;
        Ok(config)
    }
}
