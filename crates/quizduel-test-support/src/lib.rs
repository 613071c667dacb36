//! Shared test mocks and utilities for the quiz duel engine.

mod clock;
mod ledger;
mod messenger;
mod questions;
mod rng;
mod scheduler;
mod store;

pub use clock::{FixedClock, ManualClock};
pub use ledger::{InMemoryStatsLedger, RecordingScoreLedger};
pub use messenger::{RecordingMessenger, SentMessage};
pub use questions::{question, question_pool};
pub use rng::{MockRng, ScriptedRng};
pub use scheduler::RecordingScheduler;
pub use store::{FailingMatchStore, InMemoryMatchStore};
