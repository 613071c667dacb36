//! The duel match engine.
//!
//! Every read-modify-write of a match happens while holding the engine's
//! gate, so two players answering at the same instant, or a timeout racing
//! the second answer, are linearized. Message delivery happens after the
//! gate is released; anything learned from a delivery (message handles) is
//! written back only after re-reading the match and re-checking its round.

use std::fmt;
use std::sync::{Arc, Mutex};

use quizduel_core::clock::Clock;
use quizduel_core::command::Command;
use quizduel_core::error::DomainError;
use quizduel_core::rng::DeterministicRng;
use tracing::{debug, error, info, instrument, warn};

use super::ports::{MatchStore, Messenger, RoundScheduler, ScoreLedger, StatsLedger};
use super::settings::DuelSettings;
use crate::domain::aggregates::{Match, MatchStatus, RoundStamp, ScoredRound};
use crate::domain::commands::{AcceptInvite, CancelInvite, CreateInvite, StopMatch, SubmitAnswer};
use crate::domain::ids::{ChatAddress, MatchId, MessageHandle, PlayerId};
use crate::domain::notices::Notice;
use crate::domain::questions::{Question, QuestionPool};
use crate::error::DuelError;

/// What triggered a round finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeReason {
    /// The second player answered.
    BothAnswered,
    /// The round timer fired.
    Timeout,
}

impl fmt::Display for FinalizeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BothAnswered => f.write_str("both_answered"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// Acknowledgement of an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerReceipt {
    /// Answer stored; waiting for the opponent or the timeout.
    Recorded,
    /// Answer stored and the round was scored.
    RoundClosed,
}

/// Collaborators the engine is built from.
pub struct MatchEngineDeps {
    /// Match documents.
    pub store: Arc<dyn MatchStore>,
    /// Win/loss/draw records.
    pub stats: Arc<dyn StatsLedger>,
    /// Global points.
    pub scores: Arc<dyn ScoreLedger>,
    /// Outbound messages.
    pub messenger: Arc<dyn Messenger>,
    /// Round deadlines.
    pub scheduler: Arc<dyn RoundScheduler>,
    /// Questions to draw from.
    pub questions: Arc<QuestionPool>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Randomness for question draws.
    pub rng: Box<dyn DeterministicRng>,
}

struct Delivery {
    player: PlayerId,
    address: ChatAddress,
    notice: Notice,
}

struct RoundPlan {
    match_id: MatchId,
    stamp: RoundStamp,
    prompts: Vec<Delivery>,
}

struct ResultDelivery {
    address: ChatAddress,
    handle: Option<MessageHandle>,
    notice: Notice,
}

enum AfterRound {
    Next(RoundPlan),
    Finished(Vec<Delivery>),
}

struct FinalizePlan {
    results: Vec<ResultDelivery>,
    after: AfterRound,
}

/// Orchestrates invites, rounds, timeouts and completion of duels.
pub struct MatchEngine {
    store: Arc<dyn MatchStore>,
    stats: Arc<dyn StatsLedger>,
    scores: Arc<dyn ScoreLedger>,
    messenger: Arc<dyn Messenger>,
    scheduler: Arc<dyn RoundScheduler>,
    questions: Arc<QuestionPool>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn DeterministicRng>>,
    settings: DuelSettings,
    gate: tokio::sync::Mutex<()>,
}

impl MatchEngine {
    /// Creates an engine from its collaborators.
    #[must_use]
    pub fn new(deps: MatchEngineDeps, settings: DuelSettings) -> Self {
        Self {
            store: deps.store,
            stats: deps.stats,
            scores: deps.scores,
            messenger: deps.messenger,
            scheduler: deps.scheduler,
            questions: deps.questions,
            clock: deps.clock,
            rng: Mutex::new(deps.rng),
            settings,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// The engine's tunables.
    #[must_use]
    pub fn settings(&self) -> DuelSettings {
        self.settings
    }

    /// Opens a waiting match hosted by the command's player.
    ///
    /// # Errors
    ///
    /// Returns `DuelError::Storage` if the store fails.
    #[instrument(skip(self, command), fields(command_type = command.command_type(), correlation_id = %command.correlation_id(), player_id = %command.host))]
    pub async fn create_invite(&self, command: &CreateInvite) -> Result<MatchId, DuelError> {
        let _gate = self.gate.lock().await;
        self.sweep_expired().await?;

        let match_id = MatchId::generate();
        let record = Match::open(match_id, command.host, command.chat, self.clock.now());
        self.store.upsert(&record).await?;

        info!(match_id = %match_id, "duel invite created");
        Ok(match_id)
    }

    /// Withdraws an invite nobody accepted yet.
    ///
    /// # Errors
    ///
    /// `StaleMatch` if the invite is gone, `Unauthorized` unless the
    /// requester is the host, `NotCancellable` once the match started.
    #[instrument(skip(self, command), fields(command_type = command.command_type(), correlation_id = %command.correlation_id(), match_id = %command.match_id))]
    pub async fn cancel(&self, command: &CancelInvite) -> Result<(), DuelError> {
        let record = {
            let _gate = self.gate.lock().await;
            let record = self.load(command.match_id).await?;
            record.ensure_cancellable_by(command.requester)?;
            self.store.delete(record.id).await?;
            record
        };

        info!(player_id = %command.requester, "duel invite cancelled");
        if let Some(address) = record.chat_of(record.host) {
            let notice = Notice::InviteCancelled {
                match_id: record.id,
            };
            self.deliver(record.host, address, &notice).await;
        }
        Ok(())
    }

    /// Joins an invite as the second player, draws the questions and starts
    /// the first round.
    ///
    /// # Errors
    ///
    /// `StaleMatch` if the invite is gone or already accepted, `SelfAccept`
    /// if the host accepts their own invite, `NoQuestions` if the pool is
    /// empty.
    #[instrument(skip(self, command), fields(command_type = command.command_type(), correlation_id = %command.correlation_id(), match_id = %command.match_id))]
    pub async fn accept(&self, command: &AcceptInvite) -> Result<(), DuelError> {
        let (greetings, round) = {
            let _gate = self.gate.lock().await;
            self.sweep_expired().await?;

            let mut record = self.load(command.match_id).await?;
            record.ensure_acceptable_by(command.guest)?;
            let questions = self.draw_questions()?;
            record.accept(command.guest, command.chat, questions, self.clock.now())?;

            let greetings = started_notices(&record);
            let round = self.open_round(&mut record).await?;
            (greetings, round)
        };

        info!(player_id = %command.guest, "duel accepted");
        self.deliver_all(greetings).await;
        self.send_prompts(round).await;
        Ok(())
    }

    /// Records a player's answer to the current round and scores the round
    /// once both players answered.
    ///
    /// # Errors
    ///
    /// `StaleMatch` if the match is gone or not being played,
    /// `NotAParticipant`, `StaleRound` for an outdated question,
    /// `InvalidOption`, or `DuplicateAnswer` when the player already
    /// answered this round.
    #[instrument(skip(self, command), fields(command_type = command.command_type(), correlation_id = %command.correlation_id(), match_id = %command.match_id, player_id = %command.player))]
    pub async fn submit_answer(&self, command: &SubmitAnswer) -> Result<AnswerReceipt, DuelError> {
        let plan = {
            let _gate = self.gate.lock().await;
            self.sweep_expired().await?;

            let mut record = self.load(command.match_id).await?;
            let both_answered = record.record_answer(
                command.player,
                command.question_id,
                command.option,
                self.clock.now(),
            )?;
            let stamp = record
                .round_stamp()
                .ok_or(DuelError::StaleMatch(record.id))?;
            self.store.upsert(&record).await?;

            if !both_answered {
                debug!("answer recorded, waiting for opponent");
                return Ok(AnswerReceipt::Recorded);
            }
            self.finalize_round(command.match_id, FinalizeReason::BothAnswered, stamp)
                .await?
        };

        if let Some(plan) = plan {
            self.execute(plan).await;
        }
        Ok(AnswerReceipt::RoundClosed)
    }

    /// Timer entry point: scores `round` of `match_id` if it is still the
    /// round in progress. Returns `false` for a stale firing.
    ///
    /// # Errors
    ///
    /// Returns `DuelError::Storage` if a store or ledger fails.
    #[instrument(skip_all, fields(match_id = %match_id, round_index = round.round_index))]
    pub async fn round_timeout_fire(
        &self,
        match_id: MatchId,
        round: RoundStamp,
    ) -> Result<bool, DuelError> {
        let plan = {
            let _gate = self.gate.lock().await;
            self.finalize_round(match_id, FinalizeReason::Timeout, round)
                .await?
        };

        match plan {
            Some(plan) => {
                self.execute(plan).await;
                Ok(true)
            }
            None => {
                debug!("stale round timer ignored");
                Ok(false)
            }
        }
    }

    /// Ends a match on a participant's request, whatever its progress. A
    /// match whose last round is already scored is completed instead, so its
    /// outcome still reaches the stats ledger.
    ///
    /// # Errors
    ///
    /// `StaleMatch` if the match is gone, `NotAParticipant` if the requester
    /// does not play in it.
    #[instrument(skip(self, command), fields(command_type = command.command_type(), correlation_id = %command.correlation_id(), match_id = %command.match_id))]
    pub async fn stop(&self, command: &StopMatch) -> Result<(), DuelError> {
        let (record, summaries) = {
            let _gate = self.gate.lock().await;
            let record = self.load(command.match_id).await?;
            if !record.is_participant(command.requester) {
                return Err(DuelError::NotAParticipant(command.requester));
            }
            if record.is_complete() {
                let summaries = self.complete(&record).await?;
                (record, Some(summaries))
            } else {
                self.store.delete(record.id).await?;
                (record, None)
            }
        };
        if let Some(summaries) = summaries {
            self.deliver_all(summaries).await;
            return Ok(());
        }

        info!(player_id = %command.requester, round_index = record.round_index, "duel stopped");
        let notices = record
            .players
            .iter()
            .filter_map(|p| {
                record.chat_of(*p).map(|address| Delivery {
                    player: *p,
                    address,
                    notice: Notice::MatchStopped {
                        match_id: record.id,
                        stopped_by: command.requester,
                    },
                })
            })
            .collect();
        self.deliver_all(notices).await;
        Ok(())
    }

    /// Picks up matches left in the store by a previous process: re-arms the
    /// round timer of every match in progress (for the remainder of its
    /// budget) and finishes matches whose last round was scored but not yet
    /// recorded. Returns how many matches were touched.
    ///
    /// # Errors
    ///
    /// Returns `DuelError::Storage` if the store cannot be listed.
    #[instrument(skip(self))]
    pub async fn resume_pending(&self) -> Result<usize, DuelError> {
        let mut touched = 0;
        let mut summaries = Vec::new();
        let mut rounds = Vec::new();
        {
            let _gate = self.gate.lock().await;

            for mut record in self.store.list().await? {
                if record.status != MatchStatus::Active {
                    continue;
                }
                if record.is_complete() {
                    match self.complete(&record).await {
                        Ok(notices) => summaries.extend(notices),
                        Err(e) => {
                            error!(match_id = %record.id, error = %e, "could not finish pending match");
                            continue;
                        }
                    }
                } else if let Some(stamp) = record.round_stamp() {
                    let elapsed = self.clock.since(stamp.started_at).to_std().unwrap_or_default();
                    let delay = self.settings.round_timeout.saturating_sub(elapsed);
                    self.scheduler.schedule(record.id, stamp, delay);
                } else {
                    match self.open_round(&mut record).await {
                        Ok(plan) => rounds.push(plan),
                        Err(e) => {
                            error!(match_id = %record.id, error = %e, "could not open round");
                            continue;
                        }
                    }
                }
                touched += 1;
            }
        }

        info!(touched, "resumed pending duels");
        self.deliver_all(summaries).await;
        for plan in rounds {
            self.send_prompts(plan).await;
        }
        Ok(touched)
    }

    async fn sweep_expired(&self) -> Result<(), DuelError> {
        let removed = self.store.cleanup_expired(self.settings.match_ttl).await?;
        if removed > 0 {
            info!(removed, "expired duels removed");
        }
        Ok(())
    }

    async fn load(&self, match_id: MatchId) -> Result<Match, DuelError> {
        self.store
            .get(match_id)
            .await?
            .ok_or(DuelError::StaleMatch(match_id))
    }

    /// Locks the RNG only around the synchronous draw.
    fn draw_questions(&self) -> Result<Vec<Question>, DuelError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        let drawn = self
            .questions
            .draw(self.settings.rounds_per_match, &mut **rng);
        if drawn.is_empty() {
            return Err(DuelError::NoQuestions);
        }
        Ok(drawn)
    }

    /// Starts the round at `record.round_index`, persists it and arms its
    /// timer. Must be called with the gate held.
    async fn open_round(&self, record: &mut Match) -> Result<RoundPlan, DuelError> {
        let stamp = record.start_round(self.clock.now())?;
        self.store.upsert(record).await?;
        self.scheduler
            .schedule(record.id, stamp, self.settings.round_timeout);

        let question = record
            .current_question()
            .ok_or(DuelError::StaleMatch(record.id))?;
        let prompts = record
            .players
            .iter()
            .filter_map(|p| {
                record.chat_of(*p).map(|address| Delivery {
                    player: *p,
                    address,
                    notice: Notice::RoundPrompt {
                        match_id: record.id,
                        question_id: question.id,
                        round_number: stamp.round_index + 1,
                        total_rounds: record.total_rounds(),
                        text: question.text.clone(),
                        options: question.options.clone(),
                        points: question.points,
                        time_budget_secs: self.settings.round_timeout.as_secs(),
                    },
                })
            })
            .collect();

        debug!(match_id = %record.id, round_index = stamp.round_index, "round opened");
        Ok(RoundPlan {
            match_id: record.id,
            stamp,
            prompts,
        })
    }

    /// Scores the round identified by `expected` exactly once. Must be
    /// called with the gate held.
    ///
    /// Returns `None` when the match is gone, no longer active, or already
    /// past `expected`; whichever trigger got here first did the work.
    async fn finalize_round(
        &self,
        match_id: MatchId,
        reason: FinalizeReason,
        expected: RoundStamp,
    ) -> Result<Option<FinalizePlan>, DuelError> {
        let Some(mut record) = self.store.get(match_id).await? else {
            return Ok(None);
        };
        if record.status != MatchStatus::Active || record.round_stamp() != Some(expected) {
            return Ok(None);
        }

        let scored = record.score_round(self.clock.now())?;
        let results = result_notices(&record, &scored);

        let next = if record.is_complete() {
            // Completion checkpoint: survives a crash before the stats land.
            self.store.upsert(&record).await?;
            None
        } else {
            Some(self.open_round(&mut record).await?)
        };
        self.credit_points(&scored).await;

        let after = match next {
            Some(plan) => AfterRound::Next(plan),
            None => AfterRound::Finished(self.complete(&record).await?),
        };

        info!(
            match_id = %match_id,
            %reason,
            round_number = scored.round_number,
            total_rounds = scored.total_rounds,
            "round finalized"
        );
        Ok(Some(FinalizePlan { results, after }))
    }

    /// Records the outcome of a fully scored match and deletes it. Must be
    /// called with the gate held.
    async fn complete(&self, record: &Match) -> Result<Vec<Delivery>, DuelError> {
        let Some(outcome) = record.outcome() else {
            return Err(DuelError::StaleMatch(record.id));
        };

        if !self.stats.record_outcome(record.id, &outcome).await? {
            warn!(match_id = %record.id, "outcome already recorded");
        }
        self.store.delete(record.id).await?;
        info!(match_id = %record.id, ?outcome, "duel completed");

        Ok(record
            .players
            .iter()
            .filter_map(|p| {
                let address = record.chat_of(*p)?;
                let opponent = record.opponent_of(*p)?;
                Some(Delivery {
                    player: *p,
                    address,
                    notice: Notice::MatchSummary {
                        match_id: record.id,
                        standing: outcome.standing_of(*p),
                        own_score: record.score_of(*p),
                        opponent_score: record.score_of(opponent),
                    },
                })
            })
            .collect())
    }

    async fn credit_points(&self, scored: &ScoredRound) {
        for (player, verdict) in &scored.verdicts {
            if let Err(e) = self.scores.add_points(*player, verdict.delta).await {
                error!(player_id = %player, delta = verdict.delta, error = %e, "could not credit points");
            }
        }
    }

    async fn execute(&self, plan: FinalizePlan) {
        for result in plan.results {
            self.deliver_result(result).await;
        }
        match plan.after {
            AfterRound::Next(round) => self.send_prompts(round).await,
            AfterRound::Finished(summaries) => self.deliver_all(summaries).await,
        }
    }

    /// Edits the round prompt with the result, or sends a fresh message
    /// when there is no prompt to edit or the edit fails.
    async fn deliver_result(&self, result: ResultDelivery) {
        if let Some(handle) = result.handle {
            match self.messenger.edit(handle, &result.notice).await {
                Ok(()) => return,
                Err(failure) => debug!(error = %failure, "edit failed, sending result as new message"),
            }
        }
        if let Err(failure) = self.messenger.deliver(result.address, &result.notice).await {
            warn!(error = %failure, "round result not delivered");
        }
    }

    async fn send_prompts(&self, plan: RoundPlan) {
        let mut handles = Vec::with_capacity(plan.prompts.len());
        for prompt in plan.prompts {
            if let Some(handle) = self.deliver(prompt.player, prompt.address, &prompt.notice).await {
                handles.push((prompt.player, handle));
            }
        }
        if handles.is_empty() {
            return;
        }

        let _gate = self.gate.lock().await;
        match self.store.get(plan.match_id).await {
            Ok(Some(mut record)) => {
                if record.attach_round_messages(plan.stamp, handles) {
                    if let Err(e) = self.store.upsert(&record).await {
                        warn!(match_id = %plan.match_id, error = %e, "could not store round message handles");
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!(match_id = %plan.match_id, error = %e, "could not store round message handles"),
        }
    }

    async fn deliver_all(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            self.deliver(delivery.player, delivery.address, &delivery.notice)
                .await;
        }
    }

    async fn deliver(
        &self,
        player: PlayerId,
        address: ChatAddress,
        notice: &Notice,
    ) -> Option<MessageHandle> {
        match self.messenger.deliver(address, notice).await {
            Ok(handle) => Some(handle),
            Err(failure) => {
                warn!(player_id = %player, error = %failure, "notice not delivered");
                None
            }
        }
    }
}

fn started_notices(record: &Match) -> Vec<Delivery> {
    record
        .players
        .iter()
        .filter_map(|p| {
            let address = record.chat_of(*p)?;
            let opponent = record.opponent_of(*p)?;
            Some(Delivery {
                player: *p,
                address,
                notice: Notice::MatchStarted {
                    match_id: record.id,
                    opponent,
                    total_rounds: record.total_rounds(),
                },
            })
        })
        .collect()
}

fn result_notices(record: &Match, scored: &ScoredRound) -> Vec<ResultDelivery> {
    record
        .players
        .iter()
        .filter_map(|p| {
            let address = record.chat_of(*p)?;
            let opponent = record.opponent_of(*p)?;
            let own = scored.verdict_of(*p)?;
            let other = scored.verdict_of(opponent)?;
            Some(ResultDelivery {
                address,
                handle: record.round_message_refs.get(p).copied(),
                notice: Notice::RoundResult {
                    match_id: record.id,
                    round_number: scored.round_number,
                    total_rounds: scored.total_rounds,
                    points: scored.question.points,
                    own,
                    opponent: other,
                    correct_option: scored.question.correct_option,
                    correct_text: scored.question.correct_text().to_owned(),
                    explain: scored.question.explain.clone(),
                    own_score: record.score_of(*p),
                    opponent_score: record.score_of(opponent),
                },
            })
        })
        .collect()
}
