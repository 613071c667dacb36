//! Requests that change duel state.

use uuid::Uuid;

/// Implemented by every state-changing duel request; the engine records both
/// values on its tracing spans.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted name such as `duel.accept_invite`.
    fn command_type(&self) -> &'static str;

    /// Fresh per request; ties the engine's log lines to the HTTP call.
    fn correlation_id(&self) -> Uuid;
}
