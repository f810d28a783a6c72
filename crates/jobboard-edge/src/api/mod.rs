//! HTTP surface of the edge server

pub mod error;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::gate::edge_gate;
use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the router
///
/// The edge gate wraps every route and acts only on the configured
/// protected paths.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        // Pages
        .route("/", get(handlers::home))
        .route("/jobs", get(handlers::jobs))
        .route("/newJob", get(handlers::new_job))
        .route("/loginRequired", get(handlers::login_required))
        // Identity session
        .route("/api/auth/session", get(handlers::get_session))
        .route("/api/auth/signout", post(handlers::sign_out));

    if state.config.allow_mock_sign_in {
        router = router.route("/api/auth/callback/mock", post(handlers::mock_callback));
    }

    router
        .layer(middleware::from_fn_with_state(state.gate.clone(), edge_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
