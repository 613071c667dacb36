//! Round scoring and match outcomes.

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::questions::Question;

/// Score change for one player in one round.
///
/// A correct answer earns the question's points; a wrong answer or no
/// answer costs half of them, rounded up.
#[must_use]
pub fn round_delta(correct: bool, points: u8) -> i64 {
    let points = i64::from(points);
    if correct { points } else { -((points + 1) / 2) }
}

/// How one player fared in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The submitted option, or `None` if the round timed out first.
    pub answer: Option<u8>,
    /// Whether the submitted option was the correct one.
    pub correct: bool,
    /// Score change applied for the round.
    pub delta: i64,
}

impl Verdict {
    /// Judges a (possibly missing) answer against `question`.
    #[must_use]
    pub fn judge(answer: Option<u8>, question: &Question) -> Self {
        let correct = answer == Some(question.correct_option);
        Self {
            answer,
            correct,
            delta: round_delta(correct, question.points),
        }
    }
}

/// Final result of a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// One player finished strictly ahead.
    Decided {
        /// The player with the higher score.
        winner: PlayerId,
        /// The player with the lower score.
        loser: PlayerId,
    },
    /// Both players finished level.
    Draw {
        /// Both participants.
        players: [PlayerId; 2],
    },
}

impl MatchOutcome {
    /// Compares two final scores.
    #[must_use]
    pub fn from_scores(first: (PlayerId, i64), second: (PlayerId, i64)) -> Self {
        match first.1.cmp(&second.1) {
            std::cmp::Ordering::Greater => Self::Decided {
                winner: first.0,
                loser: second.0,
            },
            std::cmp::Ordering::Less => Self::Decided {
                winner: second.0,
                loser: first.0,
            },
            std::cmp::Ordering::Equal => Self::Draw {
                players: [first.0, second.0],
            },
        }
    }

    /// Result as seen by `player`.
    #[must_use]
    pub fn standing_of(&self, player: PlayerId) -> Standing {
        match self {
            Self::Decided { winner, .. } if *winner == player => Standing::Won,
            Self::Decided { .. } => Standing::Lost,
            Self::Draw { .. } => Standing::Drew,
        }
    }
}

/// A single player's view of a match outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Finished ahead.
    Won,
    /// Finished behind.
    Lost,
    /// Finished level.
    Drew,
}
