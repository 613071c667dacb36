//! The match document and its state transitions.
//!
//! A [`Match`] is created by an invite (`Waiting`), promoted to `Active` on
//! accept, advanced round by round, and deleted from the store once it
//! completes or is cancelled/stopped. There is no persisted "completed"
//! status: a match whose `round_index` equals its question count is only
//! observable between the completion checkpoint and its deletion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ChatAddress, MatchId, MessageHandle, PlayerId, QuestionId};
use super::questions::Question;
use super::scoring::{MatchOutcome, Verdict};
use crate::error::DuelError;

/// Lifecycle status of a stored match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Invite created, waiting for a guest.
    Waiting,
    /// Both players joined; rounds are being played.
    Active,
}

/// Identity of one round of one match.
///
/// Timers capture this when they are scheduled and compare it with the
/// stored match when they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStamp {
    /// Zero-based round index.
    pub round_index: usize,
    /// When the round's prompts were sent.
    pub started_at: DateTime<Utc>,
}

/// Outcome of scoring one round.
#[derive(Debug, Clone)]
pub struct ScoredRound {
    /// One-based number of the scored round.
    pub round_number: usize,
    /// Number of rounds in the match.
    pub total_rounds: usize,
    /// The question that was asked.
    pub question: Question,
    /// Per-player verdicts, in player order.
    pub verdicts: Vec<(PlayerId, Verdict)>,
}

impl ScoredRound {
    /// Verdict of `player`.
    #[must_use]
    pub fn verdict_of(&self, player: PlayerId) -> Option<Verdict> {
        self.verdicts
            .iter()
            .find(|(id, _)| *id == player)
            .map(|(_, verdict)| *verdict)
    }
}

/// One player-vs-player duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match identifier.
    pub id: MatchId,
    /// Current lifecycle status.
    pub status: MatchStatus,
    /// The player who created the invite.
    pub host: PlayerId,
    /// Participants in join order; the host comes first.
    pub players: Vec<PlayerId>,
    /// Delivery address of each participant.
    pub chats: BTreeMap<PlayerId, ChatAddress>,
    /// Questions drawn for this match at accept time.
    pub questions: Vec<Question>,
    /// Zero-based index of the current round.
    pub round_index: usize,
    /// Question of the current round.
    pub current_question_id: Option<QuestionId>,
    /// Answers submitted this round; `None` means not answered yet.
    pub answers: BTreeMap<PlayerId, Option<u8>>,
    /// Running match score per participant.
    pub scores: BTreeMap<PlayerId, i64>,
    /// When the current round's prompts were sent.
    pub round_started_at: Option<DateTime<Utc>>,
    /// Delivered round prompt per participant, edited with the result.
    pub round_message_refs: BTreeMap<PlayerId, MessageHandle>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last mutation; drives TTL cleanup.
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Opens a new invite hosted by `host`.
    #[must_use]
    pub fn open(id: MatchId, host: PlayerId, chat: ChatAddress, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: MatchStatus::Waiting,
            host,
            players: vec![host],
            chats: BTreeMap::from([(host, chat)]),
            questions: Vec::new(),
            round_index: 0,
            current_question_id: None,
            answers: BTreeMap::new(),
            scores: BTreeMap::from([(host, 0)]),
            round_started_at: None,
            round_message_refs: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `player` takes part in this match.
    #[must_use]
    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// The other participant, if `player` is one and a second has joined.
    #[must_use]
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if !self.is_participant(player) {
            return None;
        }
        self.players.iter().copied().find(|p| *p != player)
    }

    /// Delivery address of `player`.
    #[must_use]
    pub fn chat_of(&self, player: PlayerId) -> Option<ChatAddress> {
        self.chats.get(&player).copied()
    }

    /// Running match score of `player`.
    #[must_use]
    pub fn score_of(&self, player: PlayerId) -> i64 {
        self.scores.get(&player).copied().unwrap_or_default()
    }

    /// Number of rounds in this match.
    #[must_use]
    pub fn total_rounds(&self) -> usize {
        self.questions.len()
    }

    /// Whether every round has been scored.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == MatchStatus::Active && self.round_index >= self.total_rounds()
    }

    /// Whether a round is in progress.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status == MatchStatus::Active && !self.is_complete()
    }

    /// Identity of the round in progress.
    #[must_use]
    pub fn round_stamp(&self) -> Option<RoundStamp> {
        if !self.is_playing() {
            return None;
        }
        self.round_started_at.map(|started_at| RoundStamp {
            round_index: self.round_index,
            started_at,
        })
    }

    /// Question of the round in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if !self.is_playing() {
            return None;
        }
        self.questions.get(self.round_index)
    }

    /// Final result, available once every round has been scored.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if !self.is_complete() {
            return None;
        }
        match self.players.as_slice() {
            [first, second] => Some(MatchOutcome::from_scores(
                (*first, self.score_of(*first)),
                (*second, self.score_of(*second)),
            )),
            _ => None,
        }
    }

    /// Checks that `requester` may cancel this invite.
    ///
    /// # Errors
    ///
    /// `NotCancellable` unless the match is still waiting, then
    /// `Unauthorized` unless `requester` is the host.
    pub fn ensure_cancellable_by(&self, requester: PlayerId) -> Result<(), DuelError> {
        if self.status != MatchStatus::Waiting {
            return Err(DuelError::NotCancellable(self.id));
        }
        if requester != self.host {
            return Err(DuelError::Unauthorized(requester));
        }
        Ok(())
    }

    /// Checks that `guest` may accept this invite.
    ///
    /// # Errors
    ///
    /// `StaleMatch` unless the match is waiting, `SelfAccept` if `guest` is
    /// the host.
    pub fn ensure_acceptable_by(&self, guest: PlayerId) -> Result<(), DuelError> {
        if self.status != MatchStatus::Waiting {
            return Err(DuelError::StaleMatch(self.id));
        }
        if guest == self.host {
            return Err(DuelError::SelfAccept(guest));
        }
        Ok(())
    }

    /// Promotes the invite to an active match between the host and `guest`.
    ///
    /// # Errors
    ///
    /// The errors of [`Match::ensure_acceptable_by`], or `NoQuestions` if
    /// `questions` is empty.
    pub fn accept(
        &mut self,
        guest: PlayerId,
        chat: ChatAddress,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<(), DuelError> {
        self.ensure_acceptable_by(guest)?;
        if questions.is_empty() {
            return Err(DuelError::NoQuestions);
        }

        self.players = vec![self.host, guest];
        self.chats.insert(guest, chat);
        self.status = MatchStatus::Active;
        self.questions = questions;
        self.round_index = 0;
        self.current_question_id = None;
        self.answers.clear();
        self.scores = BTreeMap::from([(self.host, 0), (guest, 0)]);
        self.round_started_at = None;
        self.round_message_refs.clear();
        self.updated_at = now;
        Ok(())
    }

    /// Opens the round at `round_index`: selects its question, clears the
    /// answers and stamps the start time.
    ///
    /// # Errors
    ///
    /// `StaleMatch` if the match is not active or already complete.
    pub fn start_round(&mut self, now: DateTime<Utc>) -> Result<RoundStamp, DuelError> {
        let question_id = match self.questions.get(self.round_index) {
            Some(question) if self.is_playing() => question.id,
            _ => return Err(DuelError::StaleMatch(self.id)),
        };

        self.current_question_id = Some(question_id);
        self.answers = self.players.iter().map(|p| (*p, None)).collect();
        self.round_started_at = Some(now);
        self.round_message_refs.clear();
        self.updated_at = now;

        Ok(RoundStamp {
            round_index: self.round_index,
            started_at: now,
        })
    }

    /// Records `player`'s answer for the current round.
    ///
    /// Returns `true` when both players have now answered.
    ///
    /// # Errors
    ///
    /// In order: `StaleMatch`, `NotAParticipant`, `StaleRound`,
    /// `InvalidOption`, `DuplicateAnswer`.
    pub fn record_answer(
        &mut self,
        player: PlayerId,
        question_id: QuestionId,
        option: u8,
        now: DateTime<Utc>,
    ) -> Result<bool, DuelError> {
        let Some(question) = self.current_question() else {
            return Err(DuelError::StaleMatch(self.id));
        };
        if !self.is_participant(player) {
            return Err(DuelError::NotAParticipant(player));
        }
        if self.current_question_id != Some(question_id) {
            return Err(DuelError::StaleRound {
                match_id: self.id,
                submitted: question_id,
            });
        }
        if !question.has_option(option) {
            return Err(DuelError::InvalidOption(option));
        }
        if self.answers.get(&player).copied().flatten().is_some() {
            return Err(DuelError::DuplicateAnswer(player));
        }

        self.answers.insert(player, Some(option));
        self.updated_at = now;

        Ok(self
            .players
            .iter()
            .all(|p| self.answers.get(p).copied().flatten().is_some()))
    }

    /// Scores the current round for both players and advances
    /// `round_index`. Unanswered counts as wrong.
    ///
    /// # Errors
    ///
    /// `StaleMatch` if no round is in progress.
    pub fn score_round(&mut self, now: DateTime<Utc>) -> Result<ScoredRound, DuelError> {
        let Some(question) = self.current_question().cloned() else {
            return Err(DuelError::StaleMatch(self.id));
        };

        let verdicts: Vec<(PlayerId, Verdict)> = self
            .players
            .iter()
            .map(|p| {
                let answer = self.answers.get(p).copied().flatten();
                (*p, Verdict::judge(answer, &question))
            })
            .collect();

        for (player, verdict) in &verdicts {
            *self.scores.entry(*player).or_insert(0) += verdict.delta;
        }

        let round_number = self.round_index + 1;
        self.round_index = round_number;
        self.updated_at = now;

        Ok(ScoredRound {
            round_number,
            total_rounds: self.total_rounds(),
            question,
            verdicts,
        })
    }

    /// Stores the delivered prompt handles if `stamp` is still the round in
    /// progress. Returns whether they were stored.
    pub fn attach_round_messages(
        &mut self,
        stamp: RoundStamp,
        handles: impl IntoIterator<Item = (PlayerId, MessageHandle)>,
    ) -> bool {
        if self.round_stamp() != Some(stamp) {
            return false;
        }
        self.round_message_refs.extend(handles);
        true
    }
}
