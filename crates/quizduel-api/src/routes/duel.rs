//! Routes for the duel context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use quizduel_duel::application::engine::AnswerReceipt;
use quizduel_duel::application::query_handlers::{self, MatchView};
use quizduel_duel::domain::commands;
use quizduel_duel::domain::ids::{ChatAddress, MatchId, PlayerId, QuestionId};
use quizduel_duel::domain::invite::InviteToken;
use quizduel_duel::error::DuelError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /invite.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    /// The inviting player.
    pub host: PlayerId,
    /// Where the host receives notices.
    pub chat: ChatAddress,
}

/// Response body for POST /invite.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    /// The new match.
    pub match_id: MatchId,
    /// Shareable invite reference.
    pub invite: String,
}

/// Request body for POST /cancel and POST /stop.
#[derive(Debug, Deserialize)]
pub struct MatchActionRequest {
    /// The match to act on.
    pub match_id: MatchId,
    /// The acting player.
    pub requester: PlayerId,
}

/// Request body for POST /accept. Either `invite` or `match_id` names the
/// match; `invite` wins when both are given.
#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    /// The match to join.
    #[serde(default)]
    pub match_id: Option<MatchId>,
    /// Invite reference as handed out by POST /invite.
    #[serde(default)]
    pub invite: Option<String>,
    /// The joining player.
    pub guest: PlayerId,
    /// Where the guest receives notices.
    pub chat: ChatAddress,
}

/// Request body for POST /answer.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// The match being played.
    pub match_id: MatchId,
    /// The answering player.
    pub player: PlayerId,
    /// Question the answer is for.
    pub question_id: QuestionId,
    /// Chosen option index.
    pub option: u8,
}

/// Acknowledgement naming the affected match.
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    /// The affected match.
    pub match_id: MatchId,
}

/// Response body for POST /answer.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    /// Whether this answer closed the round.
    pub round_closed: bool,
}

/// POST /invite
#[instrument(skip(state, request), fields(player_id = %request.host))]
async fn create_invite(
    State(state): State<AppState>,
    Json(request): Json<InviteRequest>,
) -> Result<Json<InviteResponse>, ApiError> {
    let command = commands::CreateInvite {
        correlation_id: Uuid::new_v4(),
        host: request.host,
        chat: request.chat,
    };

    info!(correlation_id = %command.correlation_id, "handling create_invite command");

    let match_id = state.engine.create_invite(&command).await?;

    Ok(Json(InviteResponse {
        match_id,
        invite: InviteToken::for_match(match_id).to_string(),
    }))
}

/// POST /cancel
#[instrument(skip(state, request), fields(match_id = %request.match_id))]
async fn cancel_invite(
    State(state): State<AppState>,
    Json(request): Json<MatchActionRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let command = commands::CancelInvite {
        correlation_id: Uuid::new_v4(),
        match_id: request.match_id,
        requester: request.requester,
    };

    info!(correlation_id = %command.correlation_id, "handling cancel_invite command");

    state.engine.cancel(&command).await?;

    Ok(Json(MatchResponse {
        match_id: request.match_id,
    }))
}

/// POST /accept
#[instrument(skip(state, request), fields(player_id = %request.guest))]
async fn accept_invite(
    State(state): State<AppState>,
    Json(request): Json<AcceptRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let match_id = match (&request.invite, request.match_id) {
        (Some(invite), _) => invite.parse::<InviteToken>()?.match_id(),
        (None, Some(match_id)) => match_id,
        (None, None) => {
            return Err(DuelError::MalformedInvite("either invite or match_id is required".into()).into());
        }
    };

    let command = commands::AcceptInvite {
        correlation_id: Uuid::new_v4(),
        match_id,
        guest: request.guest,
        chat: request.chat,
    };

    info!(correlation_id = %command.correlation_id, match_id = %match_id, "handling accept_invite command");

    state.engine.accept(&command).await?;

    Ok(Json(MatchResponse { match_id }))
}

/// POST /answer
#[instrument(skip(state, request), fields(match_id = %request.match_id, player_id = %request.player))]
async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let command = commands::SubmitAnswer {
        correlation_id: Uuid::new_v4(),
        match_id: request.match_id,
        player: request.player,
        question_id: request.question_id,
        option: request.option,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_answer command");

    let receipt = state.engine.submit_answer(&command).await?;

    Ok(Json(AnswerResponse {
        round_closed: receipt == AnswerReceipt::RoundClosed,
    }))
}

/// POST /stop
#[instrument(skip(state, request), fields(match_id = %request.match_id))]
async fn stop_match(
    State(state): State<AppState>,
    Json(request): Json<MatchActionRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let command = commands::StopMatch {
        correlation_id: Uuid::new_v4(),
        match_id: request.match_id,
        requester: request.requester,
    };

    info!(correlation_id = %command.correlation_id, "handling stop_match command");

    state.engine.stop(&command).await?;

    Ok(Json(MatchResponse {
        match_id: request.match_id,
    }))
}

/// GET /{match_id}
async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchView>, ApiError> {
    let view = query_handlers::get_match_by_id(match_id, state.store.as_ref()).await?;
    Ok(Json(view))
}

/// Returns the router for the duel context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invite", post(create_invite))
        .route("/cancel", post(cancel_invite))
        .route("/accept", post(accept_invite))
        .route("/answer", post(submit_answer))
        .route("/stop", post(stop_match))
        .route("/{match_id}", get(get_match))
}
