//! Shared wiring for duel engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use quizduel_core::rng::DeterministicRng;
use quizduel_duel::application::engine::{MatchEngine, MatchEngineDeps};
use quizduel_duel::application::ports::RoundScheduler;
use quizduel_duel::application::settings::DuelSettings;
use quizduel_duel::domain::commands::{AcceptInvite, CreateInvite, SubmitAnswer};
use quizduel_duel::domain::ids::{ChatAddress, MatchId, PlayerId, QuestionId};
use quizduel_duel::domain::questions::QuestionPool;
use quizduel_test_support::{
    InMemoryMatchStore, InMemoryStatsLedger, ManualClock, MockRng, RecordingMessenger,
    RecordingScheduler, RecordingScoreLedger,
};
use uuid::Uuid;

pub const HOST: PlayerId = PlayerId(100);
pub const GUEST: PlayerId = PlayerId(200);
pub const OUTSIDER: PlayerId = PlayerId(300);
pub const HOST_CHAT: ChatAddress = ChatAddress(1000);
pub const GUEST_CHAT: ChatAddress = ChatAddress(2000);

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// An engine over in-memory collaborators, with handles to all of them.
pub struct Harness {
    pub engine: Arc<MatchEngine>,
    pub store: Arc<InMemoryMatchStore>,
    pub stats: Arc<InMemoryStatsLedger>,
    pub scores: Arc<RecordingScoreLedger>,
    pub messenger: Arc<RecordingMessenger>,
    pub scheduler: Arc<RecordingScheduler>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(pool: QuestionPool) -> Self {
        Self::with_rng(pool, Box::new(MockRng))
    }

    /// Draws questions with `rng` instead of keeping the pool order.
    pub fn with_rng(pool: QuestionPool, rng: Box<dyn DeterministicRng>) -> Self {
        let scheduler = Arc::new(RecordingScheduler::new());
        Self::assemble(pool, rng, Arc::clone(&scheduler) as Arc<dyn RoundScheduler>, scheduler)
    }

    /// Wires the engine to a real scheduler such as the tokio round timer.
    pub fn with_scheduler(pool: QuestionPool, engine_scheduler: Arc<dyn RoundScheduler>) -> Self {
        Self::assemble(
            pool,
            Box::new(MockRng),
            engine_scheduler,
            Arc::new(RecordingScheduler::new()),
        )
    }

    /// `scheduler` is only read by tests; the engine uses `engine_scheduler`.
    fn assemble(
        pool: QuestionPool,
        rng: Box<dyn DeterministicRng>,
        engine_scheduler: Arc<dyn RoundScheduler>,
        scheduler: Arc<RecordingScheduler>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let store = Arc::new(InMemoryMatchStore::new(clock.clone()));
        let stats = Arc::new(InMemoryStatsLedger::new());
        let scores = Arc::new(RecordingScoreLedger::new());
        let messenger = Arc::new(RecordingMessenger::new());

        let engine = MatchEngine::new(
            MatchEngineDeps {
                store: store.clone(),
                stats: stats.clone(),
                scores: scores.clone(),
                messenger: messenger.clone(),
                scheduler: engine_scheduler,
                questions: Arc::new(pool),
                clock: clock.clone(),
                rng,
            },
            DuelSettings::default(),
        );

        Self {
            engine: Arc::new(engine),
            store,
            stats,
            scores,
            messenger,
            scheduler,
            clock,
        }
    }

    pub async fn invite(&self) -> MatchId {
        self.engine
            .create_invite(&CreateInvite {
                correlation_id: Uuid::new_v4(),
                host: HOST,
                chat: HOST_CHAT,
            })
            .await
            .unwrap()
    }

    /// Creates an invite and has the guest accept it.
    pub async fn started_match(&self) -> MatchId {
        let match_id = self.invite().await;
        self.engine
            .accept(&accept_command(match_id, GUEST, GUEST_CHAT))
            .await
            .unwrap();
        match_id
    }

    /// Question id of the round in progress.
    pub fn current_question(&self, match_id: MatchId) -> QuestionId {
        self.store
            .snapshot(match_id)
            .and_then(|m| m.current_question_id)
            .unwrap()
    }
}

pub fn accept_command(match_id: MatchId, guest: PlayerId, chat: ChatAddress) -> AcceptInvite {
    AcceptInvite {
        correlation_id: Uuid::new_v4(),
        match_id,
        guest,
        chat,
    }
}

pub fn answer_command(
    match_id: MatchId,
    player: PlayerId,
    question_id: QuestionId,
    option: u8,
) -> SubmitAnswer {
    SubmitAnswer {
        correlation_id: Uuid::new_v4(),
        match_id,
        player,
        question_id,
        option,
    }
}
