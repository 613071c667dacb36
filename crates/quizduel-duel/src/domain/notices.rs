//! Outbound notices sent to players.
//!
//! Notices are structured; turning them into chat text and buttons is the
//! transport's job.

use serde::{Deserialize, Serialize};

use super::ids::{MatchId, PlayerId, QuestionId};
use super::scoring::{Standing, Verdict};

/// A message for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// The guest accepted and the duel begins.
    MatchStarted {
        /// The match.
        match_id: MatchId,
        /// The other participant.
        opponent: PlayerId,
        /// Number of rounds to be played.
        total_rounds: usize,
    },
    /// A new round's question.
    RoundPrompt {
        /// The match.
        match_id: MatchId,
        /// Question to answer with.
        question_id: QuestionId,
        /// One-based round number.
        round_number: usize,
        /// Number of rounds in the match.
        total_rounds: usize,
        /// Question text.
        text: String,
        /// Answer options in display order.
        options: Vec<String>,
        /// Difficulty of the question.
        points: u8,
        /// Seconds the player has to answer.
        time_budget_secs: u64,
    },
    /// Result of a finished round, from the recipient's point of view.
    RoundResult {
        /// The match.
        match_id: MatchId,
        /// One-based round number.
        round_number: usize,
        /// Number of rounds in the match.
        total_rounds: usize,
        /// Difficulty of the question.
        points: u8,
        /// The recipient's verdict.
        own: Verdict,
        /// The opponent's verdict.
        opponent: Verdict,
        /// Index of the correct option.
        correct_option: u8,
        /// Text of the correct option.
        correct_text: String,
        /// Optional explanation.
        explain: Option<String>,
        /// Recipient's running match score.
        own_score: i64,
        /// Opponent's running match score.
        opponent_score: i64,
    },
    /// Final summary after the last round.
    MatchSummary {
        /// The match.
        match_id: MatchId,
        /// Won, lost or drew.
        standing: Standing,
        /// Recipient's final score.
        own_score: i64,
        /// Opponent's final score.
        opponent_score: i64,
    },
    /// A participant stopped the match.
    MatchStopped {
        /// The match.
        match_id: MatchId,
        /// Who stopped it.
        stopped_by: PlayerId,
    },
    /// The host withdrew the invite.
    InviteCancelled {
        /// The match.
        match_id: MatchId,
    },
}
