//! Player read models.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use quizduel_duel::application::query_handlers::{self, PlayerStatsView};
use quizduel_duel::domain::ids::PlayerId;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{player_id}/stats
async fn get_stats(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<PlayerStatsView>, ApiError> {
    let view = query_handlers::get_player_stats(player_id, state.stats.as_ref()).await?;
    Ok(Json(view))
}

/// Returns the router for player queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/{player_id}/stats", get(get_stats))
}
