//! Orbit phase offsets
//!
//! Every orbiting instance starts its circle at a phase offset. The offset
//! is an input to composition so tests can pin it while production runs
//! draw it from a seeded generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of per-instance orbit phase offsets
pub trait PhaseSource {
    /// Phase offset for the instance at `index`, an integer in `[0, end_frame]`
    fn phase_offset(&mut self, index: usize, end_frame: i64) -> i64;
}

/// The same offset for every instance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedPhase(pub i64);

impl PhaseSource for FixedPhase {
    fn phase_offset(&mut self, _index: usize, _end_frame: i64) -> i64 {
        self.0
    }
}

/// Uniform offsets from a seedable generator
///
/// Each instance draws from its own generator seeded with `seed ^ index`, so
/// an instance's offset depends only on the seed and its own index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeededPhases {
    seed: u64,
}

impl SeededPhases {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Pick a seed from the operating system's entropy source
    pub fn from_entropy() -> Self {
        Self { seed: StdRng::from_entropy().gen() }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl PhaseSource for SeededPhases {
    fn phase_offset(&mut self, index: usize, end_frame: i64) -> i64 {
        let mut rng = StdRng::seed_from_u64(self.seed ^ index as u64);
        rng.gen_range(0..=end_frame.max(0))
    }
}
