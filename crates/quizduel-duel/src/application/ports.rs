//! Ports the engine depends on: storage, ledgers, messaging and timers.

use std::time::Duration;

use async_trait::async_trait;
use quizduel_core::error::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::{Match, RoundStamp};
use crate::domain::ids::{ChatAddress, MatchId, MessageHandle, PlayerId};
use crate::domain::notices::Notice;
use crate::domain::scoring::MatchOutcome;

/// Durable store of match documents.
///
/// Implementations serialize every operation through one exclusive section
/// and replace persisted state atomically: a write either fully lands or is
/// not observed.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Loads a match.
    async fn get(&self, id: MatchId) -> Result<Option<Match>, DomainError>;

    /// Inserts or replaces a match.
    async fn upsert(&self, record: &Match) -> Result<(), DomainError>;

    /// Removes a match; removing an absent match is not an error.
    async fn delete(&self, id: MatchId) -> Result<(), DomainError>;

    /// Removes every match idle for longer than `ttl` and returns how many
    /// were removed. Cheap and idempotent.
    async fn cleanup_expired(&self, ttl: Duration) -> Result<usize, DomainError>;

    /// Every stored match, used for restart recovery.
    async fn list(&self) -> Result<Vec<Match>, DomainError>;
}

/// Win/loss/draw counters of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Matches won.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
    /// Matches drawn.
    pub draws: u32,
}

impl PlayerStats {
    /// Number of completed matches.
    #[must_use]
    pub fn played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Per-player duel record.
#[async_trait]
pub trait StatsLedger: Send + Sync {
    /// Creates a zeroed record if the player has none.
    async fn ensure(&self, player: PlayerId) -> Result<(), DomainError>;

    /// Adds one win.
    async fn add_win(&self, player: PlayerId) -> Result<(), DomainError>;

    /// Adds one loss.
    async fn add_loss(&self, player: PlayerId) -> Result<(), DomainError>;

    /// Adds one draw.
    async fn add_draw(&self, player: PlayerId) -> Result<(), DomainError>;

    /// Current record; zero for unknown players.
    async fn get(&self, player: PlayerId) -> Result<PlayerStats, DomainError>;

    /// Applies `outcome` to both participants once per `match_id`.
    ///
    /// Returns `false` without touching any counter if the match was
    /// already recorded.
    async fn record_outcome(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
    ) -> Result<bool, DomainError>;
}

/// Global score accumulator shared with the single-player games.
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Adds `delta` (possibly negative) to the player's totals.
    async fn add_points(&self, player: PlayerId, delta: i64) -> Result<(), DomainError>;
}

/// A message could not be delivered or edited.
///
/// Delivery is best-effort: the engine logs and discards this, and never
/// rolls back state because of it.
#[derive(Debug, Clone, Error)]
#[error("delivery to {address} failed: {reason}")]
pub struct DeliveryFailure {
    /// The address the message was meant for.
    pub address: ChatAddress,
    /// Transport-provided reason.
    pub reason: String,
}

/// Outbound messaging capability.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Delivers a new message and returns its handle.
    async fn deliver(
        &self,
        address: ChatAddress,
        notice: &Notice,
    ) -> Result<MessageHandle, DeliveryFailure>;

    /// Replaces the content of a delivered message.
    async fn edit(&self, handle: MessageHandle, notice: &Notice) -> Result<(), DeliveryFailure>;
}

/// Schedules round deadlines.
///
/// There is no cancellation: when a deadline fires the engine compares the
/// captured round with the stored one and ignores stale firings.
pub trait RoundScheduler: Send + Sync {
    /// Arranges for `round` of `match_id` to time out after `delay`.
    fn schedule(&self, match_id: MatchId, round: RoundStamp, delay: Duration);
}
