use super::config::{ConfigError, SimulationConfig};
use super::error::EngineError;
use super::kernel::{self, StepParameters};
use super::policy::ExecutionPolicy;
use crate::core::analysis::DiffusionSummary;
use crate::core::fixed_point::{FixedPointScale, MAX_FIXED_POINT_BITS};
use crate::core::models::coordinates::CoordinateStore;
use crate::core::random::{Xoroshiro128pState, stream_states};
use nalgebra::Point2;
use tracing::{debug, info, instrument};

/// Read-only view of a walk's arrays, as handed to analysis code.
#[derive(Debug, Clone, Copy)]
pub struct WalkReader<'a> {
    pub params: StepParameters,
    pub x: &'a [i64],
    pub y: &'a [i64],
    pub rng_states: &'a [Xoroshiro128pState],
}

impl WalkReader<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Mutable view of a walk's arrays, as handed to the advance kernel.
///
/// Lengths are fixed by the owning [`RandomWalk`]; the view can change contents but never
/// the number of particles.
#[derive(Debug)]
pub struct WalkWriter<'a> {
    /// Step parameters of the owning walk; the kernel steps with exactly these.
    pub params: StepParameters,
    pub x: &'a mut [i64],
    pub y: &'a mut [i64],
    pub rng_states: &'a mut [Xoroshiro128pState],
}

/// A set of independent random walkers in the plane.
///
/// Every particle owns a fixed-point position and a Xoroshiro128+ stream state. Construction
/// seeds the streams and takes one step so that the reported initial coordinates already come
/// out of the advance path.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalk {
    config: SimulationConfig,
    scale: FixedPointScale,
    coordinates: CoordinateStore,
    rng_states: Vec<Xoroshiro128pState>,
    policy: ExecutionPolicy,
    steps_taken: u64,
}

impl RandomWalk {
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        Self::with_policy(config, ExecutionPolicy::default())
    }

    #[instrument(skip_all, name = "random_walk_setup", fields(particles = config.particle_count, policy = %policy))]
    pub fn with_policy(
        config: SimulationConfig,
        policy: ExecutionPolicy,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let scale = FixedPointScale::new(config.bits).ok_or(ConfigError::BitsOutOfRange {
            bits: config.bits,
            max: MAX_FIXED_POINT_BITS,
        })?;

        let count = config.particle_count as usize;
        debug!(
            seed = config.seed,
            replica = config.replica,
            "Carving {} particle streams.",
            count
        );
        let rng_states = stream_states(config.seed, config.replica, count);

        let mut walk = Self {
            config,
            scale,
            coordinates: CoordinateStore::zeroed(count),
            rng_states,
            policy,
            steps_taken: 0,
        };
        walk.advance(1)?;

        info!(
            bits = walk.config.bits,
            style = %walk.config.style,
            "Random walk initialized with {} particles.",
            count
        );
        Ok(walk)
    }

    /// Advances every particle by `steps` steps under the walk's own policy.
    pub fn advance(&mut self, steps: u32) -> Result<(), EngineError> {
        self.advance_with(steps, self.policy)
    }

    /// Advances every particle by `steps` steps under `policy`.
    ///
    /// Fails without moving anything if the steps could push a coordinate past the `i64`
    /// range.
    pub fn advance_with(&mut self, steps: u32, policy: ExecutionPolicy) -> Result<(), EngineError> {
        if steps == 0 {
            return Ok(());
        }

        let params = self.step_parameters();
        if !kernel::fits_capacity(self.coordinates.max_magnitude(), &params, steps) {
            return Err(EngineError::CapacityExceeded {
                steps: u64::from(steps),
                bits: self.config.bits,
                fluctuation: self.config.fluctuation,
            });
        }

        kernel::advance(self.writer(), steps, policy);
        self.steps_taken += u64::from(steps);
        Ok(())
    }

    /// Real-valued position of particle `index`.
    pub fn coordinate(&self, index: usize) -> Result<(f64, f64), EngineError> {
        let (x, y) = self.fixed_coordinate(index)?;
        Ok((self.scale.to_real(x), self.scale.to_real(y)))
    }

    pub fn fixed_coordinate(&self, index: usize) -> Result<(i64, i64), EngineError> {
        self.coordinates
            .get(index)
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn rng_state(&self, index: usize) -> Result<Xoroshiro128pState, EngineError> {
        self.rng_states
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn particle_count(&self) -> u32 {
        self.config.particle_count
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn scale(&self) -> FixedPointScale {
        self.scale
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ExecutionPolicy) {
        self.policy = policy;
    }

    /// Steps taken so far, including the one taken at construction.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn coordinates(&self) -> &CoordinateStore {
        &self.coordinates
    }

    pub fn rng_states(&self) -> &[Xoroshiro128pState] {
        &self.rng_states
    }

    pub fn reader(&self) -> WalkReader<'_> {
        WalkReader {
            params: self.step_parameters(),
            x: self.coordinates.x(),
            y: self.coordinates.y(),
            rng_states: &self.rng_states,
        }
    }

    pub fn writer(&mut self) -> WalkWriter<'_> {
        let params = self.step_parameters();
        let (x, y) = self.coordinates.columns_mut();
        WalkWriter {
            params,
            x,
            y,
            rng_states: &mut self.rng_states,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Point2<f64>> + '_ {
        self.coordinates
            .iter()
            .map(|(x, y)| Point2::new(self.scale.to_real(x), self.scale.to_real(y)))
    }

    pub fn diffusion_summary(&self) -> DiffusionSummary {
        DiffusionSummary::from_positions(self.positions(), self.steps_taken)
    }

    /// Indices of particles whose coordinates or stream states differ from `other`.
    ///
    /// Particles beyond the shorter of the two walks count as differing.
    pub fn divergent_particles(&self, other: &RandomWalk) -> Vec<usize> {
        let count = self.coordinates.len().max(other.coordinates.len());
        (0..count)
            .filter(|&i| {
                self.coordinates.get(i) != other.coordinates.get(i)
                    || self.rng_states.get(i) != other.rng_states.get(i)
            })
            .collect()
    }

    fn step_parameters(&self) -> StepParameters {
        StepParameters {
            scale: self.scale,
            fluctuation: self.config.fluctuation,
            style: self.config.style,
        }
    }

    fn out_of_range(&self, index: usize) -> EngineError {
        EngineError::IndexOutOfRange {
            index,
            count: self.coordinates.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::expected_mean_squared_displacement;
    use crate::core::random::{RandomNumberKind, Xoroshiro128pGenerator};
    use crate::engine::config::SimulationConfigBuilder;

    fn config(count: u32, style: RandomNumberKind) -> SimulationConfig {
        SimulationConfigBuilder::new()
            .particle_count(count)
            .style(style)
            .build()
            .unwrap()
    }

    #[test]
    fn construction_takes_one_step() {
        let walk = RandomWalk::new(config(4, RandomNumberKind::Gaussian)).unwrap();
        assert_eq!(walk.particle_count(), 4);
        assert_eq!(walk.steps_taken(), 1);
        assert!(walk.coordinates().iter().all(|p| p != (0, 0)));
    }

    #[test]
    fn construction_advances_each_stream_by_one_step_of_draws() {
        let walk = RandomWalk::new(config(3, RandomNumberKind::Gaussian)).unwrap();
        for i in 0..3 {
            let mut reference =
                Xoroshiro128pGenerator::from_state(Xoroshiro128pState::for_stream(1083674, i));
            for _ in 0..4 {
                reference.next_raw();
            }
            assert_eq!(walk.rng_state(i as usize).unwrap(), reference.state());
        }
    }

    #[test]
    fn zero_steps_change_nothing() {
        let mut walk = RandomWalk::new(config(8, RandomNumberKind::Uniform)).unwrap();
        let before = walk.clone();
        walk.advance(0).unwrap();
        assert_eq!(walk, before);
    }

    #[test]
    fn coordinate_rejects_indices_outside_the_series() {
        let walk = RandomWalk::new(config(3, RandomNumberKind::Gaussian)).unwrap();
        assert!(walk.coordinate(2).is_ok());
        assert_eq!(
            walk.coordinate(3),
            Err(EngineError::IndexOutOfRange { index: 3, count: 3 })
        );
        let minus_one = -1isize as usize;
        assert!(matches!(
            walk.coordinate(minus_one),
            Err(EngineError::IndexOutOfRange { count: 3, .. })
        ));
        assert!(walk.rng_state(3).is_err());
    }

    #[test]
    fn coordinate_is_fixed_value_scaled_down() {
        let walk = RandomWalk::new(config(2, RandomNumberKind::Gaussian)).unwrap();
        let (fx, fy) = walk.fixed_coordinate(1).unwrap();
        let (x, y) = walk.coordinate(1).unwrap();
        assert_eq!(x, fx as f64 / 16_777_216.0);
        assert_eq!(y, fy as f64 / 16_777_216.0);
    }

    #[test]
    fn sequential_and_parallel_policies_agree_bitwise() {
        for style in [RandomNumberKind::Gaussian, RandomNumberKind::Uniform] {
            let mut sequential =
                RandomWalk::with_policy(config(257, style), ExecutionPolicy::Sequential).unwrap();
            let mut parallel =
                RandomWalk::with_policy(config(257, style), ExecutionPolicy::Parallel).unwrap();
            sequential.advance(50).unwrap();
            parallel.advance(50).unwrap();
            assert!(sequential.divergent_particles(&parallel).is_empty());
            assert_eq!(sequential.coordinates(), parallel.coordinates());
            assert_eq!(sequential.rng_states(), parallel.rng_states());
        }
    }

    #[test]
    fn dispatch_order_does_not_matter() {
        let mut forward = RandomWalk::new(config(64, RandomNumberKind::Gaussian)).unwrap();
        let mut reversed = forward.clone();
        forward.advance(25).unwrap();

        let WalkWriter {
            params,
            x,
            y,
            rng_states,
        } = reversed.writer();
        for i in (0..x.len()).rev() {
            kernel::advance_particle(&mut x[i], &mut y[i], &mut rng_states[i], &params, 25);
        }

        assert_eq!(forward.coordinates(), reversed.coordinates());
        assert_eq!(forward.rng_states(), reversed.rng_states());
    }

    #[test]
    fn split_advances_match_a_single_advance() {
        let mut whole = RandomWalk::new(config(16, RandomNumberKind::Uniform)).unwrap();
        let mut split = whole.clone();
        whole.advance(50).unwrap();
        split.advance(30).unwrap();
        split.advance_with(20, ExecutionPolicy::Parallel).unwrap();
        assert_eq!(whole.coordinates(), split.coordinates());
        assert_eq!(whole.rng_states(), split.rng_states());
        assert_eq!(split.steps_taken(), 51);
    }

    #[test]
    fn style_changes_the_trajectory() {
        let gaussian = RandomWalk::new(config(5, RandomNumberKind::Gaussian)).unwrap();
        let uniform = RandomWalk::new(config(5, RandomNumberKind::Uniform)).unwrap();
        assert_ne!(gaussian.coordinates(), uniform.coordinates());
        assert_eq!(gaussian.divergent_particles(&uniform).len(), 5);
    }

    #[test]
    fn replica_changes_the_trajectory() {
        let base = RandomWalk::new(config(5, RandomNumberKind::Gaussian)).unwrap();
        let mut other_config = config(5, RandomNumberKind::Gaussian);
        other_config.replica = 1;
        let replica = RandomWalk::new(other_config).unwrap();
        assert_ne!(base.coordinates(), replica.coordinates());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut bad = config(1, RandomNumberKind::Gaussian);
        bad.bits = 63;
        assert!(matches!(
            RandomWalk::new(bad),
            Err(EngineError::Config(ConfigError::BitsOutOfRange { .. }))
        ));
    }

    #[test]
    fn construction_fails_when_first_step_cannot_fit() {
        let mut wide = config(2, RandomNumberKind::Gaussian);
        wide.bits = 62;
        assert!(matches!(
            RandomWalk::new(wide.clone()),
            Err(EngineError::CapacityExceeded { steps: 1, bits: 62, .. })
        ));

        wide.fluctuation = 0.0;
        let still = RandomWalk::new(wide).unwrap();
        assert!(still.coordinates().iter().all(|p| p == (0, 0)));
    }

    #[test]
    fn rejected_advance_leaves_state_untouched() {
        let mut narrow = config(4, RandomNumberKind::Gaussian);
        narrow.bits = 40;
        let mut walk = RandomWalk::new(narrow).unwrap();
        let before = walk.clone();
        assert!(matches!(
            walk.advance(u32::MAX),
            Err(EngineError::CapacityExceeded { .. })
        ));
        assert_eq!(walk, before);
    }

    #[test]
    fn empty_walk_is_valid() {
        let mut walk = RandomWalk::new(config(0, RandomNumberKind::Gaussian)).unwrap();
        walk.advance(10).unwrap();
        assert_eq!(walk.particle_count(), 0);
        assert!(walk.reader().is_empty());
        assert!(walk.coordinate(0).is_err());
    }

    #[test]
    fn reader_exposes_all_particles() {
        let walk = RandomWalk::new(config(6, RandomNumberKind::Uniform)).unwrap();
        let reader = walk.reader();
        assert_eq!(reader.len(), 6);
        assert_eq!(reader.y.len(), 6);
        assert_eq!(reader.rng_states.len(), 6);
        assert_eq!(reader.params.style, RandomNumberKind::Uniform);
        assert_eq!(reader.params.scale.bits(), 24);
    }

    #[test]
    fn views_carry_the_walk_step_parameters() {
        let mut cfg = config(3, RandomNumberKind::Uniform);
        cfg.bits = 40;
        cfg.fluctuation = 0.125;
        let mut walk = RandomWalk::new(cfg).unwrap();
        let expected = StepParameters {
            scale: FixedPointScale::new(40).unwrap(),
            fluctuation: 0.125,
            style: RandomNumberKind::Uniform,
        };
        assert_eq!(walk.reader().params, expected);
        assert_eq!(walk.writer().params, expected);
    }

    #[test]
    fn kernel_advances_with_the_writer_parameters() {
        let mut through_walk = RandomWalk::new(config(8, RandomNumberKind::Gaussian)).unwrap();
        let mut through_kernel = through_walk.clone();
        through_walk.advance_with(12, ExecutionPolicy::Sequential).unwrap();
        kernel::advance(through_kernel.writer(), 12, ExecutionPolicy::Parallel);
        assert_eq!(through_walk.coordinates(), through_kernel.coordinates());
        assert_eq!(through_walk.rng_states(), through_kernel.rng_states());
    }

    #[test]
    fn ensemble_spreads_like_a_random_walk() {
        for style in [RandomNumberKind::Gaussian, RandomNumberKind::Uniform] {
            let mut walk = RandomWalk::new(config(1000, style)).unwrap();
            walk.advance(99).unwrap();
            let summary = walk.diffusion_summary();
            let expected = expected_mean_squared_displacement(style, 1.0, 100);
            let ratio = summary.mean_squared_displacement / expected;
            assert_eq!(summary.steps, 100);
            assert!((0.9..1.1).contains(&ratio), "{style}: ratio {ratio}");
        }
    }
}
