//! Query handlers for the duel context.
//!
//! Read-only views over the match store and the stats ledger.

use std::collections::BTreeMap;

use quizduel_core::error::DomainError;
use serde::Serialize;

use super::ports::{MatchStore, StatsLedger};
use crate::domain::aggregates::MatchStatus;
use crate::domain::ids::{MatchId, PlayerId, QuestionId};

/// Read-only view of a stored match.
///
/// Questions and answers are left out so a client cannot peek at the
/// correct option or the opponent's choice.
#[derive(Debug, Serialize)]
pub struct MatchView {
    /// The match identifier.
    pub match_id: MatchId,
    /// Waiting or active.
    pub status: MatchStatus,
    /// The inviting player.
    pub host: PlayerId,
    /// Participants in join order.
    pub players: Vec<PlayerId>,
    /// Zero-based current round.
    pub round_index: usize,
    /// Number of rounds; zero until accepted.
    pub total_rounds: usize,
    /// Question of the current round.
    pub current_question_id: Option<QuestionId>,
    /// Running scores.
    pub scores: BTreeMap<PlayerId, i64>,
}

/// Retrieves a match by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no such match is stored, or the
/// store's error.
pub async fn get_match_by_id(
    match_id: MatchId,
    store: &dyn MatchStore,
) -> Result<MatchView, DomainError> {
    let record = store
        .get(match_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("match {match_id}")))?;
    Ok(MatchView {
        match_id: record.id,
        status: record.status,
        host: record.host,
        players: record.players.clone(),
        round_index: record.round_index,
        total_rounds: record.total_rounds(),
        current_question_id: record.current_question_id,
        scores: record.scores.clone(),
    })
}

/// Read-only view of a player's duel record.
#[derive(Debug, Serialize)]
pub struct PlayerStatsView {
    /// The player.
    pub player_id: PlayerId,
    /// Matches won.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
    /// Matches drawn.
    pub draws: u32,
    /// Completed matches.
    pub played: u32,
}

/// Retrieves a player's duel record; unknown players have a zero record.
///
/// # Errors
///
/// Returns the ledger's error.
pub async fn get_player_stats(
    player_id: PlayerId,
    ledger: &dyn StatsLedger,
) -> Result<PlayerStatsView, DomainError> {
    let stats = ledger.get(player_id).await?;
    Ok(PlayerStatsView {
        player_id,
        wins: stats.wins,
        losses: stats.losses,
        draws: stats.draws,
        played: stats.played(),
    })
}
