//! Commands for the duel context.

use quizduel_core::command::Command;
use uuid::Uuid;

use super::ids::{ChatAddress, MatchId, PlayerId, QuestionId};

/// Command to open a new duel invite.
#[derive(Debug, Clone)]
pub struct CreateInvite {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The inviting player.
    pub host: PlayerId,
    /// Where the host receives messages.
    pub chat: ChatAddress,
}

impl Command for CreateInvite {
    fn command_type(&self) -> &'static str {
        "duel.create_invite"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to withdraw an invite nobody accepted yet.
#[derive(Debug, Clone)]
pub struct CancelInvite {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The invite to withdraw.
    pub match_id: MatchId,
    /// The player asking to cancel.
    pub requester: PlayerId,
}

impl Command for CancelInvite {
    fn command_type(&self) -> &'static str {
        "duel.cancel_invite"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to join an invite as the second player.
#[derive(Debug, Clone)]
pub struct AcceptInvite {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The invite to join.
    pub match_id: MatchId,
    /// The joining player.
    pub guest: PlayerId,
    /// Where the guest receives messages.
    pub chat: ChatAddress,
}

impl Command for AcceptInvite {
    fn command_type(&self) -> &'static str {
        "duel.accept_invite"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to answer the current round.
#[derive(Debug, Clone)]
pub struct SubmitAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The match being played.
    pub match_id: MatchId,
    /// The answering player.
    pub player: PlayerId,
    /// The question the player saw.
    pub question_id: QuestionId,
    /// Zero-based chosen option.
    pub option: u8,
}

impl Command for SubmitAnswer {
    fn command_type(&self) -> &'static str {
        "duel.submit_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to abandon a match at any point.
#[derive(Debug, Clone)]
pub struct StopMatch {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The match to stop.
    pub match_id: MatchId,
    /// The participant asking to stop.
    pub requester: PlayerId,
}

impl Command for StopMatch {
    fn command_type(&self) -> &'static str {
        "duel.stop_match"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
