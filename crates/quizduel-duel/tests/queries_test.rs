//! Tests for the duel read models.

mod common;

use quizduel_core::error::DomainError;
use quizduel_duel::application::query_handlers::{get_match_by_id, get_player_stats};
use quizduel_duel::domain::aggregates::MatchStatus;
use quizduel_duel::domain::ids::{MatchId, PlayerId, QuestionId};
use quizduel_test_support::{FailingMatchStore, question_pool};

use common::{GUEST, HOST, Harness, answer_command};

#[tokio::test]
async fn test_get_match_by_id_returns_view_of_active_match() {
    // Arrange
    let h = Harness::new(question_pool(&[(0, 3), (0, 3), (0, 3)]));
    let match_id = h.started_match().await;

    // Act
    let view = get_match_by_id(match_id, h.store.as_ref()).await.unwrap();

    // Assert
    assert_eq!(view.match_id, match_id);
    assert_eq!(view.status, MatchStatus::Active);
    assert_eq!(view.host, HOST);
    assert_eq!(view.players, vec![HOST, GUEST]);
    assert_eq!(view.round_index, 0);
    assert_eq!(view.total_rounds, 3);
    assert_eq!(view.current_question_id, Some(QuestionId(1)));
}

#[tokio::test]
async fn test_get_match_by_id_returns_not_found_for_unknown_match() {
    // Arrange
    let h = Harness::new(question_pool(&[(0, 3)]));

    // Act
    let result = get_match_by_id(MatchId::generate(), h.store.as_ref()).await;

    // Assert
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_get_match_by_id_propagates_store_failure() {
    // Act
    let result = get_match_by_id(MatchId::generate(), &FailingMatchStore).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

#[tokio::test]
async fn test_get_player_stats_counts_completed_match() {
    // Arrange
    let h = Harness::new(question_pool(&[(0, 3)]));
    let match_id = h.started_match().await;
    let question = h.current_question(match_id);
    h.engine
        .submit_answer(&answer_command(match_id, HOST, question, 1))
        .await
        .unwrap();
    h.engine
        .submit_answer(&answer_command(match_id, GUEST, question, 0))
        .await
        .unwrap();

    // Act
    let view = get_player_stats(GUEST, h.stats.as_ref()).await.unwrap();

    // Assert
    assert_eq!(view.player_id, GUEST);
    assert_eq!((view.wins, view.losses, view.draws), (1, 0, 0));
    assert_eq!(view.played, 1);
}

#[tokio::test]
async fn test_get_player_stats_returns_zero_record_for_unknown_player() {
    // Arrange
    let h = Harness::new(question_pool(&[(0, 3)]));

    // Act
    let view = get_player_stats(PlayerId(42), h.stats.as_ref()).await.unwrap();

    // Assert
    assert_eq!(view.played, 0);
}
