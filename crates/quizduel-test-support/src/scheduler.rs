//! Test scheduler: records round deadlines instead of sleeping.

use std::sync::Mutex;
use std::time::Duration;

use quizduel_duel::application::ports::RoundScheduler;
use quizduel_duel::application::timer::RoundDeadline;
use quizduel_duel::domain::aggregates::RoundStamp;
use quizduel_duel::domain::ids::MatchId;

/// A scheduler that only remembers what it was asked to schedule. Tests
/// fire deadlines by calling `round_timeout_fire` themselves.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<RoundDeadline>>,
}

impl RecordingScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every deadline scheduled so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn scheduled(&self) -> Vec<RoundDeadline> {
        self.scheduled.lock().unwrap().clone()
    }

    /// The most recent deadline.
    ///
    /// # Panics
    ///
    /// Panics if nothing was scheduled or the mutex is poisoned.
    pub fn last(&self) -> RoundDeadline {
        *self
            .scheduled
            .lock()
            .unwrap()
            .last()
            .expect("no round deadline was scheduled")
    }
}

impl RoundScheduler for RecordingScheduler {
    fn schedule(&self, match_id: MatchId, round: RoundStamp, delay: Duration) {
        self.scheduled.lock().unwrap().push(RoundDeadline {
            match_id,
            round,
            delay,
        });
    }
}
