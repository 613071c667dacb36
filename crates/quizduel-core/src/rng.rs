//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a real RNG. In tests, a seeded or scripted
//! implementation is injected.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Production RNG backed by `StdRng`.
#[derive(Debug)]
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Seeds a new generator from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeds a new generator from a fixed value.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdRandom {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_u32_range_stays_within_bounds() {
        let mut rng = StdRandom::seeded(7);
        for _ in 0..1000 {
            let value = rng.next_u32_range(3, 9);
            assert!((3..=9).contains(&value));
        }
    }

    #[test]
    fn test_next_u32_range_with_equal_bounds_returns_min() {
        let mut rng = StdRandom::seeded(7);
        assert_eq!(rng.next_u32_range(4, 4), 4);
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let mut a = StdRandom::seeded(42);
        let mut b = StdRandom::seeded(42);
        let xs: Vec<u32> = (0..16).map(|_| a.next_u32_range(0, 100)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.next_u32_range(0, 100)).collect();
        assert_eq!(xs, ys);
    }
}
