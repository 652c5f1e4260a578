use clap::ValueEnum;
use randwalk::engine::config::SimulationConfig;
use randwalk::engine::policy::ExecutionPolicy;
use serde::{Deserialize, Serialize};

/// Which execution policies a run uses.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicySelection {
    Sequential,
    Parallel,
    /// Run both and compare the results particle by particle.
    Both,
}

impl PolicySelection {
    pub fn policies(self) -> Vec<ExecutionPolicy> {
        match self {
            PolicySelection::Sequential => vec![ExecutionPolicy::Sequential],
            PolicySelection::Parallel => vec![ExecutionPolicy::Parallel],
            PolicySelection::Both => vec![ExecutionPolicy::Sequential, ExecutionPolicy::Parallel],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub steps: u32,
    pub report: usize,
    pub policy: PolicySelection,
    pub chunk_steps: u32,
    /// Explicit particle indices; empty means evenly spaced by `report`.
    pub track: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub run: RunSettings,
}
