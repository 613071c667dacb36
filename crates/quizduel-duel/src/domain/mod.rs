//! Domain model for the duel context.

pub mod aggregates;
pub mod commands;
pub mod ids;
pub mod invite;
pub mod notices;
pub mod questions;
pub mod scoring;
