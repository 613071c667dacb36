//! Test match stores: in-memory `MatchStore` implementations for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use quizduel_core::clock::Clock;
use quizduel_core::error::DomainError;
use quizduel_duel::application::ports::MatchStore;
use quizduel_duel::domain::aggregates::Match;
use quizduel_duel::domain::ids::MatchId;

/// A match store backed by a `HashMap`. Counts upserts so tests can assert
/// how often a match was written.
pub struct InMemoryMatchStore {
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<MatchId, Match>>,
    upserts: Mutex<usize>,
}

impl InMemoryMatchStore {
    /// Create an empty store that ages records against `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: Mutex::new(HashMap::new()),
            upserts: Mutex::new(0),
        }
    }

    /// Returns a copy of the stored match, bypassing the trait.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn snapshot(&self, id: MatchId) -> Option<Match> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    /// Number of stored matches.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Whether the store is empty.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `upsert` calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn upsert_count(&self) -> usize {
        *self.upserts.lock().unwrap()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn get(&self, id: MatchId) -> Result<Option<Match>, DomainError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn upsert(&self, record: &Match) -> Result<(), DomainError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        *self.upserts.lock().unwrap() += 1;
        Ok(())
    }

    async fn delete(&self, id: MatchId) -> Result<(), DomainError> {
        self.records.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn cleanup_expired(&self, ttl: Duration) -> Result<usize, DomainError> {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, m| m.is_complete() || self.clock.since(m.updated_at) <= ttl);
        Ok(before - records.len())
    }

    async fn list(&self) -> Result<Vec<Match>, DomainError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }
}

/// A match store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingMatchStore;

#[async_trait]
impl MatchStore for FailingMatchStore {
    async fn get(&self, _id: MatchId) -> Result<Option<Match>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn upsert(&self, _record: &Match) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn delete(&self, _id: MatchId) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn cleanup_expired(&self, _ttl: Duration) -> Result<usize, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn list(&self) -> Result<Vec<Match>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
