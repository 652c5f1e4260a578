use super::models::PolicySelection;
use randwalk::core::fixed_point::DEFAULT_FIXED_POINT_BITS;
use randwalk::core::random::RandomNumberKind;
use randwalk::engine::config::{DEFAULT_FLUCTUATION, DEFAULT_SEED};
use randwalk::workflows::simulate::DEFAULT_CHUNK_STEPS;

pub struct DefaultsConfig {
    pub particles: u32,
    pub steps: u32,
    pub fluctuation: f64,
    pub style: RandomNumberKind,
    pub bits: u32,
    pub seed: u64,
    pub replica: u32,
    pub report: usize,
    pub policy: PolicySelection,
    pub chunk_steps: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            particles: 50,
            steps: 100,
            fluctuation: DEFAULT_FLUCTUATION,
            style: RandomNumberKind::Gaussian,
            bits: DEFAULT_FIXED_POINT_BITS,
            seed: DEFAULT_SEED,
            replica: 0,
            report: 8,
            policy: PolicySelection::Both,
            chunk_steps: DEFAULT_CHUNK_STEPS,
        }
    }
}
