//! Outbound notices, drained by the chat front end.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use quizduel_duel::domain::ids::ChatAddress;
use serde::Serialize;

use crate::outbox::OutboxMessage;
use crate::state::AppState;

/// Response body of GET /{chat_id}.
#[derive(Debug, Serialize)]
pub struct InboxResponse {
    /// The drained address.
    pub chat_id: ChatAddress,
    /// Pending messages, oldest first.
    pub messages: Vec<OutboxMessage>,
}

/// GET /{chat_id}
///
/// Hands out every pending notice once. A drained message can no longer be
/// edited, so round results for it arrive as new messages.
async fn drain_inbox(
    State(state): State<AppState>,
    Path(chat_id): Path<ChatAddress>,
) -> Json<InboxResponse> {
    let messages = state.outbox.drain(chat_id).await;
    Json(InboxResponse { chat_id, messages })
}

/// Returns the router for inbox draining.
pub fn router() -> Router<AppState> {
    Router::new().route("/{chat_id}", get(drain_inbox))
}
