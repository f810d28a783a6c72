//! Jobboard Edge Server
//!
//! Fronts the job dashboard. It:
//! - Gates protected pages on a confirmed identity session
//! - Serves the identity-session endpoint, re-minting the backend API
//!   credential when it nears expiry
//! - Keeps the session in a signed cookie
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /api/auth/session` - Current session with API credential
//! - `POST /api/auth/signout` - Clear the session cookie
//! - `POST /api/auth/callback/mock` - Mock sign-in (development only)
//!
//! ## Pages
//!
//! - `/`, `/loginRequired` - Public
//! - `/jobs`, `/newJob` - Gated

pub mod api;
pub mod config;
pub mod gate;
pub mod session;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, EdgeConfig};
pub use gate::{EdgeGate, GateDecision, HttpSessionLookup, SessionLookup};
pub use session::{SessionCodec, SessionService};

use jobboard_bridge::{handlers::MockHandler, IdentityBridge};
use jobboard_core::{KeyProvider, SessionPipeline, TokenMinter};
use std::sync::Arc;

/// Wire the application state from its configuration
///
/// The key provider is passed in so callers decide where key material comes
/// from; it is not touched until the first credential is minted.
pub fn build_state(
    config: EdgeConfig,
    keys: Arc<KeyProvider>,
    lookup: Arc<dyn SessionLookup>,
) -> AppState {
    let minter = TokenMinter::new(keys, config.token.clone());
    let pipeline = Arc::new(SessionPipeline::new(Arc::new(minter), &config.token));

    let sessions = SessionService::new(
        SessionCodec::new(config.session_secret.as_bytes()),
        pipeline,
        session::CookieSettings {
            secure: config.secure_cookies,
            max_age_secs: config.session_max_age_secs,
        },
    );

    let mut bridge: IdentityBridge = jobboard_bridge::default_bridge();
    if config.allow_mock_sign_in {
        bridge.register_handler(MockHandler::new());
    }

    let gate = Arc::new(EdgeGate::new(
        lookup,
        config.protected_paths.clone(),
        &config.login_path,
        &config.callback_url,
    ));

    AppState {
        sessions,
        bridge,
        gate,
        config,
    }
}
