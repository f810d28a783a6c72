//! Edge Server Binary
//!
//! Runs the dashboard's edge gate and identity-session endpoint.

use std::env;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use jobboard_core::KeyProvider;
use jobboard_edge::{build_state, create_router, EdgeConfig, HttpSessionLookup};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("JOBBOARD_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = EdgeConfig::from_env().expect("Invalid configuration");

    // Key material is imported on first mint, not here
    let keys = Arc::new(KeyProvider::from_env(config.token.key_id.clone()));

    let lookup = HttpSessionLookup::new(config.session_endpoint())
        .expect("Failed to build session lookup client");

    if config.allow_mock_sign_in {
        warn!("Mock sign-in is enabled; do not use in production");
    }

    info!(
        port = config.port,
        protected = ?config.protected_paths,
        session_endpoint = %config.session_endpoint(),
        ttl_secs = config.token.ttl_secs,
        skew_secs = config.token.skew_secs,
        "Starting edge server"
    );

    let port = config.port;
    let state = Arc::new(build_state(config, keys, Arc::new(lookup)));
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Edge server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
