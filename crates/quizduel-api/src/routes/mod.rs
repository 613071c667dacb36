//! Route modules and the assembled router.

use axum::Router;

use crate::state::AppState;

pub mod duel;
pub mod health;
pub mod inbox;
pub mod players;

/// Every route of the service, without middleware or state.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/duels", duel::router())
        .nest("/api/v1/players", players::router())
        .nest("/api/v1/inbox", inbox::router())
}
