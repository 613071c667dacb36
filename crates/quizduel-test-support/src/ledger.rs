//! Test ledgers: in-memory `StatsLedger` and `ScoreLedger` for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use quizduel_core::error::DomainError;
use quizduel_duel::application::ports::{PlayerStats, ScoreLedger, StatsLedger};
use quizduel_duel::domain::ids::{MatchId, PlayerId};
use quizduel_duel::domain::scoring::MatchOutcome;

#[derive(Debug, Default)]
struct StatsState {
    players: HashMap<PlayerId, PlayerStats>,
    recorded: HashSet<MatchId>,
}

/// A stats ledger held in memory, idempotent per match id like the real
/// one.
#[derive(Debug, Default)]
pub struct InMemoryStatsLedger {
    state: Mutex<StatsState>,
}

impl InMemoryStatsLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record of `player`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stats_of(&self, player: PlayerId) -> PlayerStats {
        self.state
            .lock()
            .unwrap()
            .players
            .get(&player)
            .copied()
            .unwrap_or_default()
    }

    /// Number of players with a record.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn player_count(&self) -> usize {
        self.state.lock().unwrap().players.len()
    }

    fn bump(&self, player: PlayerId, f: impl FnOnce(&mut PlayerStats)) {
        let mut state = self.state.lock().unwrap();
        f(state.players.entry(player).or_default());
    }
}

#[async_trait]
impl StatsLedger for InMemoryStatsLedger {
    async fn ensure(&self, player: PlayerId) -> Result<(), DomainError> {
        self.bump(player, |_| {});
        Ok(())
    }

    async fn add_win(&self, player: PlayerId) -> Result<(), DomainError> {
        self.bump(player, |s| s.wins += 1);
        Ok(())
    }

    async fn add_loss(&self, player: PlayerId) -> Result<(), DomainError> {
        self.bump(player, |s| s.losses += 1);
        Ok(())
    }

    async fn add_draw(&self, player: PlayerId) -> Result<(), DomainError> {
        self.bump(player, |s| s.draws += 1);
        Ok(())
    }

    async fn get(&self, player: PlayerId) -> Result<PlayerStats, DomainError> {
        Ok(self.stats_of(player))
    }

    async fn record_outcome(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.recorded.insert(match_id) {
            return Ok(false);
        }
        match *outcome {
            MatchOutcome::Decided { winner, loser } => {
                state.players.entry(winner).or_default().wins += 1;
                state.players.entry(loser).or_default().losses += 1;
            }
            MatchOutcome::Draw { players } => {
                for player in players {
                    state.players.entry(player).or_default().draws += 1;
                }
            }
        }
        Ok(true)
    }
}

/// A score ledger that records every `add_points` call.
#[derive(Debug, Default)]
pub struct RecordingScoreLedger {
    credits: Mutex<Vec<(PlayerId, i64)>>,
}

impl RecordingScoreLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every credit in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn credits(&self) -> Vec<(PlayerId, i64)> {
        self.credits.lock().unwrap().clone()
    }

    /// Sum of credits for `player`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn total(&self, player: PlayerId) -> i64 {
        self.credits
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, delta)| delta)
            .sum()
    }
}

#[async_trait]
impl ScoreLedger for RecordingScoreLedger {
    async fn add_points(&self, player: PlayerId, delta: i64) -> Result<(), DomainError> {
        self.credits.lock().unwrap().push((player, delta));
        Ok(())
    }
}
