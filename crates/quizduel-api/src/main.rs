//! Quiz duel API server entry point.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use quizduel_api::config::AppConfig;
use quizduel_api::error::AppError;
use quizduel_api::outbox::OutboxMessenger;
use quizduel_api::routes;
use quizduel_api::state::AppState;
use quizduel_core::clock::{Clock, SystemClock};
use quizduel_core::rng::StdRandom;
use quizduel_duel::application::engine::{MatchEngine, MatchEngineDeps};
use quizduel_duel::application::timer::RoundTimer;
use quizduel_duel::domain::questions::QuestionPool;
use quizduel_store::match_store::FileMatchStore;
use quizduel_store::score_ledger::FileScoreLedger;
use quizduel_store::stats_ledger::FileStatsLedger;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting quiz duel API server");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;

    // Open stores.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(FileMatchStore::open(config.matches_path(), Arc::clone(&clock)).await?);
    let stats = Arc::new(FileStatsLedger::open(config.stats_path(), Arc::clone(&clock)).await?);
    let scores = Arc::new(FileScoreLedger::open(config.scores_path(), Arc::clone(&clock)).await?);
    let questions = load_questions(&config.questions_path).await?;

    // Wire the engine and its round timer.
    let (timer, deadlines) = RoundTimer::channel();
    let outbox = Arc::new(OutboxMessenger::new());
    let engine = Arc::new(MatchEngine::new(
        MatchEngineDeps {
            store: store.clone(),
            stats: stats.clone(),
            scores,
            messenger: outbox.clone(),
            scheduler: Arc::new(timer),
            questions: Arc::new(questions),
            clock,
            rng: Box::new(StdRandom::from_os()),
        },
        config.settings,
    ));
    tokio::spawn(deadlines.run(Arc::clone(&engine)));

    let resumed = engine.resume_pending().await?;
    tracing::info!(resumed, "recovered duels left by the previous run");

    let app_state = AppState::new(engine, store, stats, outbox);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads and validates the question pool. An empty pool is allowed but
/// every accept will fail until questions are added.
async fn load_questions(path: &Path) -> Result<QuestionPool, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Config(format!(
            "cannot read question pool {}: {e}",
            path.display()
        ))
    })?;
    let pool = QuestionPool::from_json_str(&raw)?;
    if pool.is_empty() {
        tracing::warn!(path = %path.display(), "question pool is empty, duels cannot start");
    } else {
        tracing::info!(questions = pool.len(), "question pool loaded");
    }
    Ok(pool)
}
