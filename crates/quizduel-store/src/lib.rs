//! JSON-file persistence for the quiz duel engine.
//!
//! Each store keeps its whole document in memory behind a
//! `tokio::sync::Mutex` and replaces the file atomically on every write.

pub mod json_file;
pub mod match_store;
pub mod score_ledger;
pub mod stats_ledger;
