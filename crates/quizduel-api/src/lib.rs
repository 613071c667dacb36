//! Quiz duel HTTP API: routes, shared state, configuration and the
//! in-process outbox the engine delivers notices to.

pub mod config;
pub mod error;
pub mod outbox;
pub mod routes;
pub mod state;
