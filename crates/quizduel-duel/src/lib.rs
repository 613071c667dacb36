//! Quiz Duel: player-vs-player match bounded context.
//!
//! Responsible for duel invites, the round loop, round timeouts,
//! exactly-once scoring and per-player win/loss/draw records.

pub mod application;
pub mod domain;
pub mod error;
