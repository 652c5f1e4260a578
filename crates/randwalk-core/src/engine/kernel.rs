use super::policy::ExecutionPolicy;
use super::walk::WalkWriter;
use crate::core::fixed_point::{self, FixedPointScale};
use crate::core::random::{RandomNumberKind, Xoroshiro128pGenerator, Xoroshiro128pState};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Everything a worker needs to step a particle, shared read-only by all workers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParameters {
    pub scale: FixedPointScale,
    pub fluctuation: f64,
    pub style: RandomNumberKind,
}

/// Advances one particle by `steps` steps.
///
/// The stream state and position are loaded once, stepped in locals and written back once.
/// Each step draws the x increment before the y increment.
#[inline]
pub fn advance_particle(
    x: &mut i64,
    y: &mut i64,
    state: &mut Xoroshiro128pState,
    params: &StepParameters,
    steps: u32,
) {
    let mut generator = Xoroshiro128pGenerator::from_state(*state);
    let mut px = *x;
    let mut py = *y;
    let scale = params.scale;
    let fluctuation = params.fluctuation;

    match params.style {
        RandomNumberKind::Gaussian => {
            for _ in 0..steps {
                let bump_x = scale.to_fixed(generator.gaussian() * fluctuation);
                let bump_y = scale.to_fixed(generator.gaussian() * fluctuation);
                px = fixed_point::add(px, bump_x);
                py = fixed_point::add(py, bump_y);
            }
        }
        RandomNumberKind::Uniform => {
            for _ in 0..steps {
                let bump_x = scale.to_fixed((0.5 - generator.uniform()) * fluctuation);
                let bump_y = scale.to_fixed((0.5 - generator.uniform()) * fluctuation);
                px = fixed_point::add(px, bump_x);
                py = fixed_point::add(py, bump_y);
            }
        }
    }

    *x = px;
    *y = py;
    *state = generator.state();
}

/// Advances every particle behind `writer` by `steps` steps under the given policy, using the
/// writer's own step parameters. Performs no capacity check.
pub fn advance(writer: WalkWriter<'_>, steps: u32, policy: ExecutionPolicy) {
    let WalkWriter {
        params,
        x,
        y,
        rng_states,
    } = writer;

    match policy {
        ExecutionPolicy::Sequential => advance_sequential(x, y, rng_states, &params, steps),
        ExecutionPolicy::Parallel => advance_parallel(x, y, rng_states, &params, steps),
    }
}

fn advance_sequential(
    x: &mut [i64],
    y: &mut [i64],
    rng_states: &mut [Xoroshiro128pState],
    params: &StepParameters,
    steps: u32,
) {
    for ((xi, yi), state) in x.iter_mut().zip(y.iter_mut()).zip(rng_states.iter_mut()) {
        advance_particle(xi, yi, state, params, steps);
    }
}

#[cfg(feature = "parallel")]
fn advance_parallel(
    x: &mut [i64],
    y: &mut [i64],
    rng_states: &mut [Xoroshiro128pState],
    params: &StepParameters,
    steps: u32,
) {
    x.par_iter_mut()
        .zip(y.par_iter_mut())
        .zip(rng_states.par_iter_mut())
        .for_each(|((xi, yi), state)| advance_particle(xi, yi, state, params, steps));
}

#[cfg(not(feature = "parallel"))]
fn advance_parallel(
    x: &mut [i64],
    y: &mut [i64],
    rng_states: &mut [Xoroshiro128pState],
    params: &StepParameters,
    steps: u32,
) {
    debug!("Built without the `parallel` feature; advancing sequentially.");
    advance_sequential(x, y, rng_states, params, steps);
}

/// Upper bound on the magnitude of one step's fixed-point increment on either axis.
pub fn max_step_increment(params: &StepParameters) -> u64 {
    let bound = params.style.magnitude_bound() * params.fluctuation.abs() * params.scale.scale();
    let bound = bound.ceil() + 1.0;
    if bound.is_finite() && bound < u64::MAX as f64 {
        bound as u64
    } else {
        u64::MAX
    }
}

/// Whether `steps` more steps are guaranteed to keep every coordinate inside `i64`, given the
/// largest magnitude currently held.
pub fn fits_capacity(current_max: u64, params: &StepParameters, steps: u32) -> bool {
    if steps == 0 {
        return true;
    }
    let growth = u128::from(steps) * u128::from(max_step_increment(params));
    let reach = u128::from(current_max) + growth;
    let fits = reach <= i64::MAX as u128;
    if !fits {
        debug!(
            current_max,
            steps,
            increment = max_step_increment(params),
            "Advance rejected by the fixed-point capacity check."
        );
    }
    fits
}
