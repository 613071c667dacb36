//! Engine tunables.

use std::time::Duration;

/// Tunables of the duel engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelSettings {
    /// Questions drawn per match (fewer when the pool is smaller).
    pub rounds_per_match: usize,
    /// Time each player has to answer a round.
    pub round_timeout: Duration,
    /// Idle time after which a stored match is garbage-collected.
    pub match_ttl: Duration,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            rounds_per_match: 5,
            round_timeout: Duration::from_secs(60),
            match_ttl: Duration::from_secs(60 * 60),
        }
    }
}
