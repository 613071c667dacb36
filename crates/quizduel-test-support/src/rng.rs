//! Test RNG: deterministic `DeterministicRng` implementations for tests.

use std::collections::VecDeque;

use quizduel_core::rng::DeterministicRng;

/// Always picks the lowest value, so question draws keep the pool order.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Replays scripted picks, clamped into the requested range, then falls
/// back to `min` once the script runs out.
#[derive(Debug)]
pub struct ScriptedRng {
    picks: VecDeque<u32>,
}

impl ScriptedRng {
    /// Create an RNG that returns `picks` in order.
    #[must_use]
    pub fn new(picks: impl IntoIterator<Item = u32>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl DeterministicRng for ScriptedRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.picks
            .pop_front()
            .map_or(min, |pick| pick.clamp(min, max.max(min)))
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
