//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use quizduel_core::clock::Clock;
use quizduel_duel::application::engine::{MatchEngine, MatchEngineDeps};
use quizduel_duel::application::settings::DuelSettings;
use quizduel_duel::domain::questions::QuestionPool;
use quizduel_test_support::{
    FixedClock, InMemoryMatchStore, InMemoryStatsLedger, MockRng, RecordingScheduler,
    RecordingScoreLedger,
};
use tower::ServiceExt;

use quizduel_api::outbox::OutboxMessenger;
use quizduel_api::routes;
use quizduel_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()))
}

/// Build the full app router over in-memory stores and a deterministic
/// Clock/RNG. Uses the same route structure as `main.rs`.
pub fn build_test_app(pool: QuestionPool) -> Router {
    let clock = fixed_clock();
    let store = Arc::new(InMemoryMatchStore::new(Arc::clone(&clock)));
    let stats = Arc::new(InMemoryStatsLedger::new());
    let outbox = Arc::new(OutboxMessenger::new());
    let engine = MatchEngine::new(
        MatchEngineDeps {
            store: store.clone(),
            stats: stats.clone(),
            scores: Arc::new(RecordingScoreLedger::new()),
            messenger: outbox.clone(),
            scheduler: Arc::new(RecordingScheduler::new()),
            questions: Arc::new(pool),
            clock,
            rng: Box::new(MockRng),
        },
        DuelSettings::default(),
    );
    let app_state = AppState::new(Arc::new(engine), store, stats, outbox);

    routes::app_router().with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
