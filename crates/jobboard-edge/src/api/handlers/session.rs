//! Identity-session endpoints

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use jobboard_bridge::{IdentityBridge, ProviderKind};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::api::error::ApiError;
use crate::config::EdgeConfig;
use crate::gate::EdgeGate;
use crate::session::{session_token, SessionService};

/// Application state shared across handlers
pub struct AppState {
    pub sessions: SessionService,
    /// Sign-in gate for provider profiles
    ///
    /// Google and GitHub profiles reach it from the external OAuth layer once
    /// the provider handshake completes; only the mock callback is routed here.
    pub bridge: IdentityBridge,
    pub gate: Arc<EdgeGate>,
    pub config: EdgeConfig,
}

fn empty_session() -> Response {
    ([(header::CACHE_CONTROL, "no-store")], Json(json!({}))).into_response()
}

/// Current session
///
/// GET /api/auth/session
///
/// Answers `{}` for anonymous callers and whenever a fresh credential cannot
/// be produced. Otherwise re-issues the cookie and returns the exposed
/// session.
pub async fn get_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(token) = session_token(&headers) else {
        return empty_session();
    };

    match state.sessions.refresh(&token).await {
        Ok(Some(active)) => (
            [
                (header::CACHE_CONTROL, "no-store".to_string()),
                (header::SET_COOKIE, state.sessions.cookies().issue(&active.cookie_value)),
            ],
            Json(active.outcome.client),
        )
            .into_response(),
        Ok(None) => (
            [
                (header::CACHE_CONTROL, "no-store".to_string()),
                (header::SET_COOKIE, state.sessions.cookies().clear()),
            ],
            Json(json!({})),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Session refresh failed, answering as signed out");
            empty_session()
        }
    }
}

/// Sign out
///
/// POST /api/auth/signout
pub async fn sign_out(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::SET_COOKIE, state.sessions.cookies().clear())],
        Json(json!({})),
    )
        .into_response()
}

/// Development sign-in with a mock profile
///
/// POST /api/auth/callback/mock
///
/// Only routed when mock sign-in is enabled.
pub async fn mock_callback(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<Value>,
) -> Result<Response, ApiError> {
    let identity = state.bridge.sign_in(ProviderKind::Mock, &profile)?;
    let active = state.sessions.establish(&identity).await?;

    Ok((
        [
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::SET_COOKIE, state.sessions.cookies().issue(&active.cookie_value)),
        ],
        Json(active.outcome.client),
    )
        .into_response())
}
