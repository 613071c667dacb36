//! Shareable invite references.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::ids::MatchId;
use crate::error::DuelError;

const PREFIX: &str = "pvp_";

/// Deep-link payload that resolves back to a match, e.g. `pvp_3f2a...`.
///
/// The payload is 36 characters of `[a-z0-9_]`, which fits a chat
/// platform's start parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InviteToken(MatchId);

impl InviteToken {
    /// Token for `match_id`.
    #[must_use]
    pub fn for_match(match_id: MatchId) -> Self {
        Self(match_id)
    }

    /// The match this token refers to.
    #[must_use]
    pub fn match_id(&self) -> MatchId {
        self.0
    }
}

impl fmt::Display for InviteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

impl FromStr for InviteToken {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| DuelError::MalformedInvite(s.to_owned()))?;
        if hex.len() != 32 {
            return Err(DuelError::MalformedInvite(s.to_owned()));
        }
        let uuid = Uuid::try_parse(hex).map_err(|_| DuelError::MalformedInvite(s.to_owned()))?;
        Ok(Self(MatchId(uuid)))
    }
}
