//! Injectable random source
//!
//! Every random decision in both engines goes through [`RandomSource`], so a
//! seeded [`GameRng`] reproduces a run exactly and tests can script outcomes.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform random numbers for the simulations
pub trait RandomSource {
    /// Uniform float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Uniform index in [0, n). `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize {
        ((self.next_f32() * n as f32) as usize).min(n.saturating_sub(1))
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform float in [lo, hi)
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }

    /// Uniform float in [-half, half)
    fn spread(&mut self, half: f32) -> f32 {
        (self.next_f32() - 0.5) * 2.0 * half
    }
}

/// Seeded PCG generator
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg32,
    seed: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for GameRng {
    fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    fn below(&mut self, n: usize) -> usize {
        self.inner.random_range(0..n)
    }

    fn chance(&mut self, p: f32) -> bool {
        self.inner.random::<f32>() < p
    }
}
