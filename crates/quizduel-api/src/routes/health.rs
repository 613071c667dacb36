//! Liveness probe for the duel service.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

const SERVICE: &str = "quizduel-api";

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `quizduel-api`.
    pub service: &'static str,
    /// `ok`, or `degraded` when the match store cannot be read.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Stored matches, waiting or active; absent when degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_duels: Option<usize>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let open_duels = match state.store.list().await {
        Ok(matches) => Some(matches.len()),
        Err(e) => {
            warn!(error = %e, "health check could not read the match store");
            None
        }
    };
    Json(HealthResponse {
        service: SERVICE,
        status: if open_duels.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        open_duels,
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
