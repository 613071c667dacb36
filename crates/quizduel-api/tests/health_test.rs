//! Integration test for the health endpoint.

mod common;

use axum::http::StatusCode;
use quizduel_test_support::question_pool;
use serde_json::json;

#[tokio::test]
async fn test_health_names_service_and_version() {
    let app = common::build_test_app(question_pool(&[(0, 3)]));

    let (status, json) = common::get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["service"], "quizduel-api");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["open_duels"], 0);
}

#[tokio::test]
async fn test_health_counts_open_duels() {
    // Arrange
    let app = common::build_test_app(question_pool(&[(0, 3)]));
    let (status, _) = common::post_json(
        app.clone(),
        "/api/v1/duels/invite",
        &json!({ "host": 100, "chat": 1000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (_, json) = common::get_json(app, "/health").await;

    // Assert
    assert_eq!(json["open_duels"], 1);
}
