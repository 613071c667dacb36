//! Application layer: ports, the match engine, its round timer and queries.

pub mod engine;
pub mod ports;
pub mod query_handlers;
pub mod settings;
pub mod timer;
