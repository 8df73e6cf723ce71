//! Seeded integer stream shared by the level generator and the trace puzzle.
//!
//! The stream is a small linear congruential generator. It is not meant to be
//! statistically strong, only reproducible: a level or puzzle can be rebuilt
//! exactly from the seed it reports.

use bracket_random::prelude::RandomNumberGenerator;

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233_280;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomSequence {
    seed: u64,
    state: u64,
}

impl RandomSequence {
    pub fn new(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    /// Picks a seed from the system entropy source. The seed is kept so the run
    /// can be replayed with [`RandomSequence::new`].
    pub fn from_entropy() -> Self {
        let mut rng = RandomNumberGenerator::new();
        Self::new(rng.range(1, i32::MAX) as u64)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next value in `[0, 1)`.
    pub fn next_fraction(&mut self) -> f64 {
        self.state = (self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Inclusive on both ends. An empty range collapses to `min` but still
    /// advances the stream.
    pub fn next_in_range(&mut self, min: i32, max: i32) -> i32 {
        let span = (max as i64 - min as i64 + 1).max(1);
        let offset = (self.next_fraction() * span as f64).floor() as i64;
        (min as i64 + offset.min(span - 1)) as i32
    }

    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.next_in_range(0, len as i32 - 1) as usize
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_in_range(0, i as i32) as usize;
            items.swap(i, j);
        }
    }
}
