//! Shared application state.

use std::sync::Arc;

use quizduel_duel::application::engine::MatchEngine;
use quizduel_duel::application::ports::{MatchStore, StatsLedger};

use crate::outbox::OutboxMessenger;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The duel engine.
    pub engine: Arc<MatchEngine>,
    /// Match documents, for read-only views.
    pub store: Arc<dyn MatchStore>,
    /// Duel records, for read-only views.
    pub stats: Arc<dyn StatsLedger>,
    /// Where the engine's notices wait to be drained.
    pub outbox: Arc<OutboxMessenger>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        engine: Arc<MatchEngine>,
        store: Arc<dyn MatchStore>,
        stats: Arc<dyn StatsLedger>,
        outbox: Arc<OutboxMessenger>,
    ) -> Self {
        Self {
            engine,
            store,
            stats,
            outbox,
        }
    }
}
