//! File-backed `ScoreLedger` with all-time and per-day totals.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use quizduel_core::clock::Clock;
use quizduel_core::error::DomainError;
use quizduel_duel::application::ports::ScoreLedger;
use quizduel_duel::domain::ids::PlayerId;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::json_file::JsonFile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScoreDocument {
    #[serde(default)]
    total: BTreeMap<PlayerId, i64>,
    /// UTC day, then player.
    #[serde(default)]
    daily: BTreeMap<NaiveDate, BTreeMap<PlayerId, i64>>,
}

/// Global points shared with the other game modes.
pub struct FileScoreLedger {
    file: JsonFile,
    clock: Arc<dyn Clock>,
    document: Mutex<ScoreDocument>,
}

impl FileScoreLedger {
    /// Opens the ledger at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the file exists but cannot
    /// be read or parsed.
    pub async fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let file = JsonFile::new(path);
        let document: ScoreDocument = file.load().await?;
        Ok(Self {
            file,
            clock,
            document: Mutex::new(document),
        })
    }

    /// All-time points of `player`.
    pub async fn total(&self, player: PlayerId) -> i64 {
        self.document
            .lock()
            .await
            .total
            .get(&player)
            .copied()
            .unwrap_or_default()
    }

    /// Points `player` made on the current UTC day.
    pub async fn today(&self, player: PlayerId) -> i64 {
        let day = self.clock.now().date_naive();
        self.document
            .lock()
            .await
            .daily
            .get(&day)
            .and_then(|players| players.get(&player))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScoreLedger for FileScoreLedger {
    async fn add_points(&self, player: PlayerId, delta: i64) -> Result<(), DomainError> {
        let day = self.clock.now().date_naive();

        let mut document = self.document.lock().await;
        let mut next = document.clone();
        *next.total.entry(player).or_default() += delta;
        *next
            .daily
            .entry(day)
            .or_default()
            .entry(player)
            .or_default() += delta;
        self.file.store(&next).await?;
        *document = next;
        Ok(())
    }
}
