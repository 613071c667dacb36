//! Error types for the duel context.

use quizduel_core::error::DomainError;
use thiserror::Error;

use crate::domain::ids::{MatchId, PlayerId, QuestionId};

/// Rejections and failures returned by duel operations.
///
/// Every rejection is returned before the store is touched.
#[derive(Debug, Error)]
pub enum DuelError {
    /// The match is gone or not in the status the transition needs.
    #[error("match {0} is no longer available for this action")]
    StaleMatch(MatchId),

    /// The answer refers to a question that is not the current round's.
    #[error("question {submitted} is not the current question of match {match_id}")]
    StaleRound {
        /// The match the answer was for.
        match_id: MatchId,
        /// The question id the player answered.
        submitted: QuestionId,
    },

    /// The player already answered this round.
    #[error("player {0} already answered this round")]
    DuplicateAnswer(PlayerId),

    /// Only the host may cancel an invite.
    #[error("player {0} is not allowed to cancel this invite")]
    Unauthorized(PlayerId),

    /// The match already started and can only be stopped.
    #[error("match {0} already started and cannot be cancelled")]
    NotCancellable(MatchId),

    /// The actor does not take part in the match.
    #[error("player {0} is not a participant of this match")]
    NotAParticipant(PlayerId),

    /// A host tried to accept their own invite.
    #[error("player {0} cannot accept their own invite")]
    SelfAccept(PlayerId),

    /// The submitted option does not exist on the question.
    #[error("option {0} does not exist on the current question")]
    InvalidOption(u8),

    /// The question pool is empty, so no match can start.
    #[error("the question pool is empty")]
    NoQuestions,

    /// An invite token could not be parsed.
    #[error("malformed invite token: {0}")]
    MalformedInvite(String),

    /// A store or ledger failed.
    #[error(transparent)]
    Storage(#[from] DomainError),
}
