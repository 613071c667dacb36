//! Tokio-backed round timer.
//!
//! [`RoundTimer`] is the scheduler handed to the engine; it only queues
//! deadlines. [`RoundDeadlines::run`] owns the engine and sleeps on each
//! deadline in its own task before calling
//! [`MatchEngine::round_timeout_fire`]. Timers are never cancelled; a
//! firing for a round that already moved on is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::engine::MatchEngine;
use super::ports::RoundScheduler;
use crate::domain::aggregates::RoundStamp;
use crate::domain::ids::MatchId;

/// A queued round deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundDeadline {
    /// The match whose round may time out.
    pub match_id: MatchId,
    /// The round captured at scheduling time.
    pub round: RoundStamp,
    /// How long to wait before firing.
    pub delay: Duration,
}

/// Scheduler half of the round timer.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    tx: mpsc::UnboundedSender<RoundDeadline>,
}

/// Driver half of the round timer.
#[derive(Debug)]
pub struct RoundDeadlines {
    rx: mpsc::UnboundedReceiver<RoundDeadline>,
}

impl RoundTimer {
    /// Creates a connected scheduler/driver pair.
    #[must_use]
    pub fn channel() -> (Self, RoundDeadlines) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, RoundDeadlines { rx })
    }
}

impl RoundScheduler for RoundTimer {
    fn schedule(&self, match_id: MatchId, round: RoundStamp, delay: Duration) {
        let deadline = RoundDeadline {
            match_id,
            round,
            delay,
        };
        if self.tx.send(deadline).is_err() {
            warn!(match_id = %match_id, "round timer driver is gone, deadline dropped");
        }
    }
}

impl RoundDeadlines {
    /// Fires every queued deadline against `engine` until all schedulers are
    /// dropped.
    pub async fn run(mut self, engine: Arc<MatchEngine>) {
        while let Some(deadline) = self.rx.recv().await {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                tokio::time::sleep(deadline.delay).await;
                match engine
                    .round_timeout_fire(deadline.match_id, deadline.round)
                    .await
                {
                    Ok(fired) => debug!(match_id = %deadline.match_id, fired, "round deadline reached"),
                    Err(e) => error!(match_id = %deadline.match_id, error = %e, "round timeout failed"),
                }
            });
        }
    }
}
