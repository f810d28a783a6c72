//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jobboard_bridge::BridgeError;
use serde::Serialize;
use thiserror::Error;

use crate::session::SessionError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Sign-in refused: {0}")]
    SignInRefused(String),

    #[error("Session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::SignInRefused(msg) => (StatusCode::FORBIDDEN, "SIGN_IN_REFUSED", msg.clone()),
            ApiError::SessionUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SESSION_UNAVAILABLE",
                msg.clone(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::InvalidProfile(msg) => ApiError::BadRequest(msg),
            BridgeError::UnknownProvider(p) => ApiError::BadRequest(format!("Unknown provider: {}", p)),
            other => ApiError::SignInRefused(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Refresh(e) => ApiError::SessionUnavailable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
