use super::{box_muller, unit_uniform};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Outputs discarded after seeding so that similar seeds do not start on similar states.
pub const DEFAULT_SCRUB_CYCLES: usize = 10;

/// Jump polynomial advancing the orbit by 2^64 steps.
const JUMP: [u64; 2] = [0xdf900294d8f554a5, 0x170865df4b3201fc];

/// Jump polynomial advancing the orbit by 2^96 steps.
const LONG_JUMP: [u64; 2] = [0xd2a98b26625eee7b, 0xdddf9b1090aa7ac1];

/// Substituted for the all-zero state, which is a fixed point of the generator.
const NONZERO_FALLBACK: Xoroshiro128pState = Xoroshiro128pState {
    s0: 0x9e3779b97f4a7c15,
    s1: 0xbf58476d1ce4e5b9,
};

/// One step of the SplitMix64 sequence, used to expand a 64-bit seed into generator state.
#[inline]
pub fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// The 128-bit state vector of a Xoroshiro128+ stream.
///
/// This is the only thing a particle needs to remember between advances; a generator is
/// placed on the stream with [`Xoroshiro128pGenerator::from_state`] and the ticked state is
/// read back with [`Xoroshiro128pGenerator::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Xoroshiro128pState {
    pub s0: u64,
    pub s1: u64,
}

impl Xoroshiro128pState {
    pub fn new(s0: u64, s1: u64) -> Self {
        if s0 == 0 && s1 == 0 {
            NONZERO_FALLBACK
        } else {
            Self { s0, s1 }
        }
    }

    /// Canonical seeding with [`DEFAULT_SCRUB_CYCLES`] discarded outputs.
    pub fn from_seed(seed: u64) -> Self {
        Self::from_seed_with_scrub(seed, DEFAULT_SCRUB_CYCLES)
    }

    pub fn from_seed_with_scrub(seed: u64, scrub_cycles: usize) -> Self {
        let mut sm = seed;
        let s0 = splitmix64(&mut sm);
        let s1 = splitmix64(&mut sm);
        let mut generator = Xoroshiro128pGenerator::from_state(Self::new(s0, s1));
        for _ in 0..scrub_cycles {
            generator.next_raw();
        }
        generator.state()
    }

    /// State of sub-stream `stream_index`: the canonical seeding of `seed` followed by
    /// exactly `stream_index` jumps.
    pub fn for_stream(seed: u64, stream_index: u64) -> Self {
        let mut generator = Xoroshiro128pGenerator::new(seed);
        for _ in 0..stream_index {
            generator.jump();
        }
        generator.state()
    }

    /// Returns the next output together with the advanced state.
    #[inline]
    pub fn next(self) -> (u64, Self) {
        let mut generator = Xoroshiro128pGenerator::from_state(self);
        let value = generator.next_raw();
        (value, generator.state())
    }

    pub fn jumped(self) -> Self {
        let mut generator = Xoroshiro128pGenerator::from_state(self);
        generator.jump();
        generator.state()
    }
}

/// Derives `count` disjoint per-particle states from one seed.
///
/// The base stream is long-jumped `replica` times, then each particle receives the current
/// state before the stream jumps again. With `replica == 0`, entry `i` equals
/// [`Xoroshiro128pState::for_stream`]`(seed, i)`.
pub fn stream_states(seed: u64, replica: u32, count: usize) -> Vec<Xoroshiro128pState> {
    let mut generator = Xoroshiro128pGenerator::new(seed);
    for _ in 0..replica {
        generator.long_jump();
    }
    let mut states = Vec::with_capacity(count);
    for _ in 0..count {
        states.push(generator.state());
        generator.jump();
    }
    states
}

/// Xoroshiro128+ (shift/rotate parameters 24, 16, 37).
///
/// The generator is a thin, cheap wrapper around [`Xoroshiro128pState`] that provides the
/// methods to draw numbers and tick the state forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoroshiro128pGenerator {
    state: Xoroshiro128pState,
}

impl Xoroshiro128pGenerator {
    pub fn new(seed: u64) -> Self {
        Self::from_state(Xoroshiro128pState::from_seed(seed))
    }

    pub fn with_scrub_cycles(seed: u64, scrub_cycles: usize) -> Self {
        Self::from_state(Xoroshiro128pState::from_seed_with_scrub(seed, scrub_cycles))
    }

    #[inline]
    pub fn from_state(state: Xoroshiro128pState) -> Self {
        Self { state }
    }

    #[inline]
    pub fn state(&self) -> Xoroshiro128pState {
        self.state
    }

    #[inline]
    pub fn set_state(&mut self, state: Xoroshiro128pState) {
        self.state = state;
    }

    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        let s0 = self.state.s0;
        let mut s1 = self.state.s1;
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state.s0 = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state.s1 = s1.rotate_left(37);

        result
    }

    /// A uniform deviate in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        unit_uniform(self.next_raw())
    }

    /// A standard normal deviate. Consumes exactly two outputs.
    #[inline]
    pub fn gaussian(&mut self) -> f64 {
        let u1 = self.uniform();
        let u2 = self.uniform();
        box_muller(u1, u2)
    }

    /// Advances the stream by 2^64 outputs.
    pub fn jump(&mut self) {
        self.apply_jump(&JUMP);
    }

    /// Advances the stream by 2^96 outputs.
    pub fn long_jump(&mut self) {
        self.apply_jump(&LONG_JUMP);
    }

    fn apply_jump(&mut self, polynomial: &[u64; 2]) {
        let mut s0 = 0u64;
        let mut s1 = 0u64;
        for &word in polynomial {
            for bit in 0..64 {
                if word & (1u64 << bit) != 0 {
                    s0 ^= self.state.s0;
                    s1 ^= self.state.s1;
                }
                self.next_raw();
            }
        }
        self.state = Xoroshiro128pState { s0, s1 };
    }
}

impl RngCore for Xoroshiro128pGenerator {
    fn next_u32(&mut self) -> u32 {
        (self.next_raw() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_raw()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xoroshiro128pGenerator {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&seed[..8]);
        hi.copy_from_slice(&seed[8..]);
        Self::from_state(Xoroshiro128pState::new(
            u64::from_le_bytes(lo),
            u64::from_le_bytes(hi),
        ))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::Rng;
    use std::collections::HashSet;

    const SEED: u64 = 1083674;

    #[test]
    fn splitmix64_matches_reference_output() {
        let mut state = 0u64;
        assert_eq!(splitmix64(&mut state), 0xe220a8397b1dcdaf);
    }

    #[test]
    fn canonical_seeding_matches_reference_state() {
        assert_eq!(
            Xoroshiro128pState::from_seed_with_scrub(SEED, 0),
            Xoroshiro128pState::new(0xa3b860d83919323a, 0x51e4a428e1ac7f74)
        );
        assert_eq!(
            Xoroshiro128pState::from_seed(SEED),
            Xoroshiro128pState::new(0x4044b9744e87f590, 0x467012678a7c821d)
        );
    }

    #[test]
    fn next_raw_matches_reference_outputs() {
        let mut generator = Xoroshiro128pGenerator::new(SEED);
        assert_eq!(generator.next_raw(), 0x86b4cbdbd90477ad);
        assert_eq!(generator.next_raw(), 0x78d8d9bde9cb95ac);
        assert_eq!(generator.next_raw(), 0xf703f3b641197060);
    }

    #[test]
    fn functional_next_agrees_with_generator() {
        let state = Xoroshiro128pState::from_seed(SEED);
        let (value, advanced) = state.next();
        let mut generator = Xoroshiro128pGenerator::from_state(state);
        assert_eq!(value, generator.next_raw());
        assert_eq!(advanced, generator.state());
    }

    #[test]
    fn for_stream_matches_reference_state() {
        assert_eq!(
            Xoroshiro128pState::for_stream(SEED, 2),
            Xoroshiro128pState::new(0xce33990701fd7616, 0xfa345d3eff38828b)
        );
        assert_eq!(
            Xoroshiro128pState::for_stream(SEED, 0),
            Xoroshiro128pState::from_seed(SEED)
        );
    }

    #[test]
    fn stream_states_agree_with_per_index_derivation() {
        let states = stream_states(SEED, 0, 6);
        for (i, state) in states.iter().enumerate() {
            assert_eq!(*state, Xoroshiro128pState::for_stream(SEED, i as u64));
        }
    }

    #[test]
    fn stream_states_are_pairwise_distinct() {
        let states = stream_states(SEED, 0, 10_000);
        let unique: HashSet<_> = states.iter().copied().collect();
        assert_eq!(unique.len(), states.len());
    }

    #[test]
    fn replicas_start_from_long_jumped_streams() {
        let mut generator = Xoroshiro128pGenerator::new(SEED);
        generator.long_jump();
        let replica_one = stream_states(SEED, 1, 2);
        assert_eq!(replica_one[0], generator.state());
        assert_ne!(replica_one[0], stream_states(SEED, 0, 1)[0]);
    }

    #[test]
    fn all_zero_state_is_replaced() {
        let state = Xoroshiro128pState::new(0, 0);
        assert_ne!(state, Xoroshiro128pState { s0: 0, s1: 0 });
        let mut generator = Xoroshiro128pGenerator::from_state(state);
        assert_ne!(generator.next_raw(), generator.next_raw());
    }

    #[test]
    fn jump_does_not_consume_the_caller_state() {
        let state = Xoroshiro128pState::from_seed(SEED);
        let jumped = state.jumped();
        assert_ne!(state, jumped);
        assert_eq!(jumped, Xoroshiro128pState::for_stream(SEED, 1));
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut generator = Xoroshiro128pGenerator::new(7);
        for _ in 0..10_000 {
            let u = generator.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn gaussian_has_standard_moments() {
        let mut generator = Xoroshiro128pGenerator::new(SEED);
        let n = 200_000;
        let samples: Vec<f64> = (0..n).map(|_| generator.gaussian()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.01, "mean was {mean}");
        assert!((variance - 1.0).abs() < 0.02, "variance was {variance}");
    }

    #[test]
    fn gaussian_consumes_two_outputs() {
        let mut a = Xoroshiro128pGenerator::new(SEED);
        let mut b = a.clone();
        a.gaussian();
        b.next_raw();
        b.next_raw();
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn fill_bytes_writes_little_endian_outputs() {
        let mut a = Xoroshiro128pGenerator::new(SEED);
        let mut b = a.clone();
        let mut buffer = [0u8; 12];
        a.fill_bytes(&mut buffer);
        let first = b.next_raw().to_le_bytes();
        let second = b.next_raw().to_le_bytes();
        assert_eq!(&buffer[..8], &first);
        assert_eq!(&buffer[8..], &second[..4]);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn seedable_rng_uses_canonical_seeding() {
        assert_eq!(
            Xoroshiro128pGenerator::seed_from_u64(SEED),
            Xoroshiro128pGenerator::new(SEED)
        );
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&5u64.to_le_bytes());
        bytes[8..].copy_from_slice(&9u64.to_le_bytes());
        let generator = Xoroshiro128pGenerator::from_seed(bytes);
        assert_eq!(generator.state(), Xoroshiro128pState::new(5, 9));
    }

    #[test]
    fn works_as_a_rand_rng() {
        let mut generator = Xoroshiro128pGenerator::new(SEED);
        for _ in 0..1000 {
            let value: u32 = generator.gen_range(10..20);
            assert!((10..20).contains(&value));
        }
    }

    proptest! {
        #[test]
        fn jump_commutes_with_next(s0 in any::<u64>(), s1 in any::<u64>()) {
            let state = Xoroshiro128pState::new(s0, s1);
            let (_, stepped) = state.next();
            let (_, jumped_then_stepped) = state.jumped().next();
            prop_assert_eq!(stepped.jumped(), jumped_then_stepped);
        }

        #[test]
        fn long_jump_commutes_with_jump(s0 in any::<u64>(), s1 in any::<u64>()) {
            let state = Xoroshiro128pState::new(s0, s1);
            let mut a = Xoroshiro128pGenerator::from_state(state);
            a.jump();
            a.long_jump();
            let mut b = Xoroshiro128pGenerator::from_state(state);
            b.long_jump();
            b.jump();
            prop_assert_eq!(a.state(), b.state());
        }
    }
}
