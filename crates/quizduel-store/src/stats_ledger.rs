//! File-backed `StatsLedger`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use quizduel_core::clock::Clock;
use quizduel_core::error::DomainError;
use quizduel_duel::application::ports::{PlayerStats, StatsLedger};
use quizduel_duel::domain::ids::{MatchId, PlayerId};
use quizduel_duel::domain::scoring::MatchOutcome;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::json_file::JsonFile;

/// How long a recorded match id is remembered by default.
pub const DEFAULT_AUDIT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StatsDocument {
    #[serde(default)]
    players: BTreeMap<PlayerId, PlayerStats>,
    /// Matches whose outcome was applied, with the time it was applied.
    #[serde(default)]
    recorded: BTreeMap<MatchId, DateTime<Utc>>,
}

/// Per-player duel records kept in one JSON file.
///
/// Outcomes are applied together with an audit entry for the match in a
/// single write, which makes `record_outcome` safe to retry.
pub struct FileStatsLedger {
    file: JsonFile,
    clock: Arc<dyn Clock>,
    retention: Duration,
    document: Mutex<StatsDocument>,
}

impl FileStatsLedger {
    /// Opens the ledger at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the file exists but cannot
    /// be read or parsed.
    pub async fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let file = JsonFile::new(path);
        let document: StatsDocument = file.load().await?;
        Ok(Self {
            file,
            clock,
            retention: DEFAULT_AUDIT_RETENTION,
            document: Mutex::new(document),
        })
    }

    /// Overrides how long recorded match ids are remembered.
    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    async fn update(&self, apply: impl FnOnce(&mut StatsDocument)) -> Result<(), DomainError> {
        let mut document = self.document.lock().await;
        let mut next = document.clone();
        apply(&mut next);
        self.file.store(&next).await?;
        *document = next;
        Ok(())
    }
}

#[async_trait]
impl StatsLedger for FileStatsLedger {
    async fn ensure(&self, player: PlayerId) -> Result<(), DomainError> {
        if self.document.lock().await.players.contains_key(&player) {
            return Ok(());
        }
        self.update(|doc| {
            doc.players.entry(player).or_default();
        })
        .await
    }

    async fn add_win(&self, player: PlayerId) -> Result<(), DomainError> {
        self.update(|doc| doc.players.entry(player).or_default().wins += 1)
            .await
    }

    async fn add_loss(&self, player: PlayerId) -> Result<(), DomainError> {
        self.update(|doc| doc.players.entry(player).or_default().losses += 1)
            .await
    }

    async fn add_draw(&self, player: PlayerId) -> Result<(), DomainError> {
        self.update(|doc| doc.players.entry(player).or_default().draws += 1)
            .await
    }

    async fn get(&self, player: PlayerId) -> Result<PlayerStats, DomainError> {
        Ok(self
            .document
            .lock()
            .await
            .players
            .get(&player)
            .copied()
            .unwrap_or_default())
    }

    async fn record_outcome(
        &self,
        match_id: MatchId,
        outcome: &MatchOutcome,
    ) -> Result<bool, DomainError> {
        let now = self.clock.now();
        let retention = TimeDelta::from_std(self.retention).unwrap_or(TimeDelta::MAX);

        let mut document = self.document.lock().await;
        if document.recorded.contains_key(&match_id) {
            debug!(match_id = %match_id, "outcome already recorded");
            return Ok(false);
        }

        let mut next = document.clone();
        next.recorded.retain(|_, at| now - *at <= retention);
        next.recorded.insert(match_id, now);
        match *outcome {
            MatchOutcome::Decided { winner, loser } => {
                next.players.entry(winner).or_default().wins += 1;
                next.players.entry(loser).or_default().losses += 1;
            }
            MatchOutcome::Draw { players } => {
                for player in players {
                    next.players.entry(player).or_default().draws += 1;
                }
            }
        }
        self.file.store(&next).await?;
        *document = next;
        Ok(true)
    }
}
