//! Quiz duel API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizduel_core::error::DomainError;
use quizduel_duel::error::DuelError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A store or the question pool could not be loaded.
    #[error("storage error: {0}")]
    Storage(#[from] DomainError),

    /// Restart recovery failed.
    #[error("engine error: {0}")]
    Engine(#[from] DuelError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DuelError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DuelError);

impl From<DuelError> for ApiError {
    fn from(err: DuelError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(DuelError::Storage(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DuelError::StaleMatch(_) => (StatusCode::CONFLICT, "stale_match"),
            DuelError::StaleRound { .. } => (StatusCode::CONFLICT, "stale_round"),
            DuelError::DuplicateAnswer(_) => (StatusCode::CONFLICT, "duplicate_answer"),
            DuelError::NotCancellable(_) => (StatusCode::CONFLICT, "not_cancellable"),
            DuelError::Unauthorized(_) => (StatusCode::FORBIDDEN, "unauthorized"),
            DuelError::NotAParticipant(_) => (StatusCode::FORBIDDEN, "not_a_participant"),
            DuelError::SelfAccept(_) => (StatusCode::BAD_REQUEST, "self_accept"),
            DuelError::InvalidOption(_) => (StatusCode::BAD_REQUEST, "invalid_option"),
            DuelError::MalformedInvite(_) => (StatusCode::BAD_REQUEST, "malformed_invite"),
            DuelError::NoQuestions => (StatusCode::SERVICE_UNAVAILABLE, "no_questions"),
            DuelError::Storage(DomainError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            DuelError::Storage(DomainError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            DuelError::Storage(DomainError::Infrastructure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use quizduel_duel::domain::ids::{MatchId, PlayerId, QuestionId};

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        let response = err.into().into_response();
        response.status()
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let match_id = MatchId::generate();
        assert_eq!(status_of(DuelError::StaleMatch(match_id)), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DuelError::StaleRound {
                match_id,
                submitted: QuestionId(3),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DuelError::DuplicateAnswer(PlayerId(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DuelError::NotCancellable(match_id)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_permission_errors_map_to_403() {
        assert_eq!(
            status_of(DuelError::Unauthorized(PlayerId(2))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DuelError::NotAParticipant(PlayerId(3))),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_requests_map_to_400() {
        assert_eq!(
            status_of(DuelError::SelfAccept(PlayerId(1))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(DuelError::InvalidOption(7)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DuelError::MalformedInvite("pvp_zz".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_empty_pool_maps_to_503() {
        assert_eq!(
            status_of(DuelError::NoQuestions),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_storage_errors_map_by_kind() {
        assert_eq!(
            status_of(DomainError::NotFound("match".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Infrastructure("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
