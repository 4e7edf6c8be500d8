//! Random number generator abstraction for determinism.
//!
//! The turn engine never rolls dice itself. Callers that need to turn a dice
//! count into per-die results go through this trait, so tests and replays
//! can inject a seeded or recorded implementation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Rolls `count` dice with `sides` faces each.
pub fn roll_dice(rng: &mut dyn DeterministicRng, count: usize, sides: u32) -> Vec<u32> {
    (0..count).map(|_| rng.next_u32_range(1, sides)).collect()
}

/// Production RNG backed by a `StdRng`.
#[derive(Debug)]
pub struct StdDiceRng(StdRng);

impl StdDiceRng {
    /// Creates an RNG seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates an RNG with a fixed seed, for reproducible sessions.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdDiceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}
