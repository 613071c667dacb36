//! File-backed `MatchStore`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use quizduel_core::clock::Clock;
use quizduel_core::error::DomainError;
use quizduel_duel::application::ports::MatchStore;
use quizduel_duel::domain::aggregates::Match;
use quizduel_duel::domain::ids::MatchId;
use tokio::sync::Mutex;
use tracing::debug;

use crate::json_file::JsonFile;

type MatchMap = BTreeMap<MatchId, Match>;

/// Match documents kept in one JSON file keyed by match id.
///
/// The map is cached in memory. Every write persists a modified copy first
/// and swaps it into the cache only after the file was replaced, so a
/// failed write changes neither.
pub struct FileMatchStore {
    file: JsonFile,
    clock: Arc<dyn Clock>,
    matches: Mutex<MatchMap>,
}

impl FileMatchStore {
    /// Opens the store at `path`, loading whatever a previous process left.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the file exists but cannot
    /// be read or parsed.
    pub async fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let file = JsonFile::new(path);
        let matches: MatchMap = file.load().await?;
        debug!(path = %file.path().display(), count = matches.len(), "match store opened");
        Ok(Self {
            file,
            clock,
            matches: Mutex::new(matches),
        })
    }
}

#[async_trait]
impl MatchStore for FileMatchStore {
    async fn get(&self, id: MatchId) -> Result<Option<Match>, DomainError> {
        Ok(self.matches.lock().await.get(&id).cloned())
    }

    async fn upsert(&self, record: &Match) -> Result<(), DomainError> {
        let mut matches = self.matches.lock().await;
        let mut next = matches.clone();
        next.insert(record.id, record.clone());
        self.file.store(&next).await?;
        *matches = next;
        Ok(())
    }

    async fn delete(&self, id: MatchId) -> Result<(), DomainError> {
        let mut matches = self.matches.lock().await;
        if !matches.contains_key(&id) {
            return Ok(());
        }
        let mut next = matches.clone();
        next.remove(&id);
        self.file.store(&next).await?;
        *matches = next;
        Ok(())
    }

    async fn cleanup_expired(&self, ttl: Duration) -> Result<usize, DomainError> {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let mut matches = self.matches.lock().await;
        let mut next = matches.clone();
        // Completion checkpoints wait for `resume_pending`, whatever their age.
        next.retain(|_, m| m.is_complete() || self.clock.since(m.updated_at) <= ttl);
        let removed = matches.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }
        self.file.store(&next).await?;
        *matches = next;
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<Match>, DomainError> {
        Ok(self.matches.lock().await.values().cloned().collect())
    }
}
