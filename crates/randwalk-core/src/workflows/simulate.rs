use crate::core::analysis::DiffusionSummary;
use crate::engine::config::{ConfigError, SimulationConfig};
use crate::engine::error::EngineError;
use crate::engine::policy::ExecutionPolicy;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::walk::RandomWalk;
use tracing::{info, instrument, warn};

pub const DEFAULT_CHUNK_STEPS: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Total steps per particle, counting the step taken while the walk is constructed.
    pub steps: u32,
    /// Policies to run side by side. The first one is the reference for comparisons.
    pub policies: Vec<ExecutionPolicy>,
    /// Indices of the particles whose coordinates are reported.
    pub tracked: Vec<usize>,
    /// Steps per advance call between progress updates.
    pub chunk_steps: u32,
}

impl RunOptions {
    pub fn new(steps: u32) -> Self {
        Self {
            steps,
            policies: vec![ExecutionPolicy::Sequential],
            tracked: Vec::new(),
            chunk_steps: DEFAULT_CHUNK_STEPS,
        }
    }

    pub fn with_policies(mut self, policies: Vec<ExecutionPolicy>) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_tracked(mut self, tracked: Vec<usize>) -> Self {
        self.tracked = tracked;
        self
    }

    pub fn with_chunk_steps(mut self, chunk_steps: u32) -> Self {
        self.chunk_steps = chunk_steps;
        self
    }
}

/// Coordinates of one tracked particle, one entry per policy in run order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedParticle {
    pub index: usize,
    pub initial: Vec<(f64, f64)>,
    pub final_position: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    pub policies: Vec<ExecutionPolicy>,
    pub tracked: Vec<TrackedParticle>,
    pub total_steps: u64,
    pub diffusion: DiffusionSummary,
    /// Particles whose final fixed-point coordinates or stream states differ from the reference
    /// policy in at least one other policy.
    pub mismatched_particles: usize,
}

impl SimulationReport {
    pub fn policies_agree(&self) -> bool {
        self.mismatched_particles == 0
    }
}

/// `report` indices spread evenly over `0..particle_count`, as `k * N / report`.
pub fn evenly_spaced_indices(particle_count: usize, report: usize) -> Vec<usize> {
    if particle_count == 0 || report == 0 {
        return Vec::new();
    }
    let n = particle_count as u128;
    let r = report as u128;
    let mut indices: Vec<usize> = (0..r).map(|k| (k * n / r) as usize).collect();
    indices.dedup();
    indices
}

#[instrument(skip_all, name = "simulate_workflow", fields(particles = config.particle_count, steps = options.steps))]
pub fn run(
    config: &SimulationConfig,
    options: &RunOptions,
    reporter: &ProgressReporter,
) -> Result<SimulationReport, EngineError> {
    if options.steps == 0 {
        return Err(ConfigError::ZeroSteps.into());
    }
    let policies = if options.policies.is_empty() {
        warn!("No execution policy requested; using the sequential loop.");
        vec![ExecutionPolicy::Sequential]
    } else {
        options.policies.clone()
    };

    // === Phase 1: Seeding ===
    reporter.report(Progress::PhaseStart {
        name: "Seeding particle streams",
    });
    let mut walks = policies
        .iter()
        .map(|&policy| RandomWalk::with_policy(config.clone(), policy))
        .collect::<Result<Vec<_>, _>>()?;

    let count = config.particle_count as usize;
    if let Some(&bad) = options.tracked.iter().find(|&&i| i >= count) {
        return Err(EngineError::IndexOutOfRange { index: bad, count });
    }
    let initial = sample(&walks, &options.tracked)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Advancing ===
    reporter.report(Progress::PhaseStart {
        name: "Advancing particles",
    });
    // Construction already took the first step.
    let remaining = options.steps - 1;
    let chunk = options.chunk_steps.max(1);
    for walk in walks.iter_mut() {
        info!(
            policy = %walk.policy(),
            "Advancing {} particles by {} steps.",
            count,
            remaining
        );
        reporter.report(Progress::TaskStart {
            total_steps: u64::from(remaining),
        });
        let mut done = 0u32;
        while done < remaining {
            let step = chunk.min(remaining - done);
            walk.advance(step)?;
            done += step;
            reporter.report(Progress::TaskIncrement {
                amount: u64::from(step),
            });
        }
        reporter.report(Progress::TaskFinish);
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Comparison ===
    let final_positions = sample(&walks, &options.tracked)?;
    let tracked = options
        .tracked
        .iter()
        .zip(initial)
        .zip(final_positions)
        .map(|((&index, initial), final_position)| TrackedParticle {
            index,
            initial,
            final_position,
        })
        .collect();

    let reference = &walks[0];
    let mut mismatched = vec![false; count];
    for other in &walks[1..] {
        for i in reference.divergent_particles(other) {
            if let Some(flag) = mismatched.get_mut(i) {
                *flag = true;
            }
        }
    }
    let mismatched_particles = mismatched.iter().filter(|&&m| m).count();
    if walks.len() > 1 {
        let verdict = if mismatched_particles > 0 {
            let verdict = format!(
                "{} of {} particles differ between execution policies.",
                mismatched_particles, count
            );
            warn!("{}", verdict);
            verdict
        } else {
            let verdict = format!(
                "All {} execution policies produced identical coordinates.",
                walks.len()
            );
            info!("{}", verdict);
            verdict
        };
        reporter.report(Progress::Message(verdict));
    }

    Ok(SimulationReport {
        config: config.clone(),
        policies,
        tracked,
        total_steps: reference.steps_taken(),
        diffusion: reference.diffusion_summary(),
        mismatched_particles,
    })
}

fn sample(walks: &[RandomWalk], indices: &[usize]) -> Result<Vec<Vec<(f64, f64)>>, EngineError> {
    indices
        .iter()
        .map(|&i| {
            walks
                .iter()
                .map(|walk| walk.coordinate(i))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}
