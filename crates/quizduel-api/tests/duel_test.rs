//! Integration tests for the duel routes, played end to end over HTTP.

mod common;

use axum::http::StatusCode;
use quizduel_test_support::question_pool;
use serde_json::{Value, json};

const HOST: i64 = 100;
const GUEST: i64 = 200;
const HOST_CHAT: i64 = 1000;
const GUEST_CHAT: i64 = 2000;

async fn create_invite(app: &axum::Router) -> (String, String) {
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/duels/invite",
        &json!({ "host": HOST, "chat": HOST_CHAT }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        json["match_id"].as_str().unwrap().to_owned(),
        json["invite"].as_str().unwrap().to_owned(),
    )
}

async fn drain(app: &axum::Router, chat: i64) -> Vec<Value> {
    let (status, json) = common::get_json(app.clone(), &format!("/api/v1/inbox/{chat}")).await;
    assert_eq!(status, StatusCode::OK);
    json["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["notice"].clone())
        .collect()
}

#[tokio::test]
async fn test_duel_played_over_http_updates_stats() {
    let app = common::build_test_app(question_pool(&[(2, 4)]));

    // Invite and accept through the invite token.
    let (match_id, invite) = create_invite(&app).await;
    assert!(invite.starts_with("pvp_"));
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/duels/accept",
        &json!({ "invite": invite, "guest": GUEST, "chat": GUEST_CHAT }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["match_id"], match_id);

    // Both players see the start and the first prompt.
    let host_inbox = drain(&app, HOST_CHAT).await;
    assert_eq!(host_inbox[0]["type"], "match_started");
    assert_eq!(host_inbox[0]["opponent"], GUEST);
    assert_eq!(host_inbox[1]["type"], "round_prompt");
    let question_id = host_inbox[1]["question_id"].clone();

    let (status, view) = common::get_json(app.clone(), &format!("/api/v1/duels/{match_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "active");
    assert_eq!(view["total_rounds"], 1);

    // Host answers correctly, guest does not.
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/duels/answer",
        &json!({ "match_id": match_id, "player": HOST, "question_id": question_id, "option": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["round_closed"], false);

    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/duels/answer",
        &json!({ "match_id": match_id, "player": GUEST, "question_id": question_id, "option": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["round_closed"], true);

    // The host's prompt was drained, so the result arrives as a new message.
    let host_inbox = drain(&app, HOST_CHAT).await;
    assert_eq!(host_inbox[0]["type"], "round_result");
    assert_eq!(host_inbox[0]["own_score"], 4);
    assert_eq!(host_inbox[0]["opponent_score"], -2);
    assert_eq!(host_inbox[1]["type"], "match_summary");
    assert_eq!(host_inbox[1]["standing"], "won");

    // The guest never drained, so the prompt itself became the result.
    let guest_inbox = drain(&app, GUEST_CHAT).await;
    assert_eq!(guest_inbox[0]["type"], "match_started");
    assert_eq!(guest_inbox[1]["type"], "round_result");
    assert_eq!(guest_inbox[2]["type"], "match_summary");

    let (status, _) = common::get_json(app.clone(), &format!("/api/v1/duels/{match_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stats) =
        common::get_json(app.clone(), &format!("/api/v1/players/{HOST}/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["wins"], 1);
    assert_eq!(stats["played"], 1);

    let (_, stats) = common::get_json(app, &format!("/api/v1/players/{GUEST}/stats")).await;
    assert_eq!(stats["losses"], 1);
}

#[tokio::test]
async fn test_duplicate_answer_returns_409() {
    let app = common::build_test_app(question_pool(&[(0, 3), (0, 3)]));
    let (match_id, _) = create_invite(&app).await;
    common::post_json(
        app.clone(),
        "/api/v1/duels/accept",
        &json!({ "match_id": match_id, "guest": GUEST, "chat": GUEST_CHAT }),
    )
    .await;
    let body = json!({ "match_id": match_id, "player": HOST, "question_id": 1, "option": 0 });
    common::post_json(app.clone(), "/api/v1/duels/answer", &body).await;

    let (status, json) = common::post_json(app, "/api/v1/duels/answer", &body).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "duplicate_answer");
}

#[tokio::test]
async fn test_cancel_by_guest_returns_403_and_by_host_succeeds() {
    let app = common::build_test_app(question_pool(&[(0, 3)]));
    let (match_id, _) = create_invite(&app).await;

    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/duels/cancel",
        &json!({ "match_id": match_id, "requester": GUEST }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = common::post_json(
        app.clone(),
        "/api/v1/duels/cancel",
        &json!({ "match_id": match_id, "requester": HOST }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drain(&app, HOST_CHAT).await[0]["type"], "invite_cancelled");
}

#[tokio::test]
async fn test_cancel_after_accept_returns_409() {
    let app = common::build_test_app(question_pool(&[(0, 3)]));
    let (match_id, _) = create_invite(&app).await;
    common::post_json(
        app.clone(),
        "/api/v1/duels/accept",
        &json!({ "match_id": match_id, "guest": GUEST, "chat": GUEST_CHAT }),
    )
    .await;

    let (status, json) = common::post_json(
        app,
        "/api/v1/duels/cancel",
        &json!({ "match_id": match_id, "requester": HOST }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "not_cancellable");
}

#[tokio::test]
async fn test_self_accept_returns_400() {
    let app = common::build_test_app(question_pool(&[(0, 3)]));
    let (_, invite) = create_invite(&app).await;

    let (status, json) = common::post_json(
        app,
        "/api/v1/duels/accept",
        &json!({ "invite": invite, "guest": HOST, "chat": HOST_CHAT }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "self_accept");
}

#[tokio::test]
async fn test_accept_with_empty_pool_returns_503() {
    let app = common::build_test_app(quizduel_duel::domain::questions::QuestionPool::default());
    let (match_id, _) = create_invite(&app).await;

    let (status, json) = common::post_json(
        app,
        "/api/v1/duels/accept",
        &json!({ "match_id": match_id, "guest": GUEST, "chat": GUEST_CHAT }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "no_questions");
}

#[tokio::test]
async fn test_stop_notifies_both_players() {
    let app = common::build_test_app(question_pool(&[(0, 3), (0, 3)]));
    let (match_id, _) = create_invite(&app).await;
    common::post_json(
        app.clone(),
        "/api/v1/duels/accept",
        &json!({ "match_id": match_id, "guest": GUEST, "chat": GUEST_CHAT }),
    )
    .await;

    let (status, _) = common::post_json(
        app.clone(),
        "/api/v1/duels/stop",
        &json!({ "match_id": match_id, "requester": GUEST }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    for chat in [HOST_CHAT, GUEST_CHAT] {
        let inbox = drain(&app, chat).await;
        let last = inbox.last().unwrap();
        assert_eq!(last["type"], "match_stopped");
        assert_eq!(last["stopped_by"], GUEST);
    }
    let (status, json) = common::post_json(
        app,
        "/api/v1/duels/stop",
        &json!({ "match_id": match_id, "requester": GUEST }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "stale_match");
}
