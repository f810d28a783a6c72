//! Edge gate
//!
//! Runs before any protected page is served. Cookie presence alone is not
//! trusted: each gated request is confirmed against the identity-session
//! endpoint, and anything short of a session expiring strictly in the future
//! redirects to the login-required page.

pub mod lookup;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::session::cookie::{cookie_header, session_token};

pub use lookup::{HttpSessionLookup, SessionLookup, SessionSnapshot, SessionValidationError};

/// Header set on speculative prefetch navigations
pub const PREFETCH_HEADER: &str = "x-middleware-prefetch";

/// Outcome of gating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Redirect to the given location
    Deny(String),
}

/// Why a request was denied (for logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DenyReason {
    NoCookie,
    LookupFailed,
    NoExpiry,
    Expired,
}

pub struct EdgeGate {
    lookup: Arc<dyn SessionLookup>,
    protected_paths: Vec<String>,
    deny_location: String,
}

impl EdgeGate {
    pub fn new(
        lookup: Arc<dyn SessionLookup>,
        protected_paths: Vec<String>,
        login_path: &str,
        callback_url: &str,
    ) -> Self {
        Self {
            lookup,
            protected_paths,
            deny_location: format!("{}?callbackUrl={}", login_path, callback_url),
        }
    }

    /// Whether `path` is gated; matching is exact
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_paths.iter().any(|p| p == path)
    }

    pub fn deny_location(&self) -> &str {
        &self.deny_location
    }

    /// Decide a request to a protected path
    pub async fn evaluate(&self, method: &Method, headers: &HeaderMap) -> GateDecision {
        if method == Method::HEAD || is_prefetch(headers) {
            return GateDecision::Allow;
        }

        if session_token(headers).is_none() {
            return self.deny(DenyReason::NoCookie);
        }

        let cookies = cookie_header(headers).unwrap_or_default();
        let snapshot = match self.lookup.lookup(&cookies).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Session lookup failed");
                return self.deny(DenyReason::LookupFailed);
            }
        };

        let Some(expires) = snapshot.expires.as_deref() else {
            return self.deny(DenyReason::NoExpiry);
        };

        match DateTime::parse_from_rfc3339(expires) {
            Ok(expires) if expires.with_timezone(&Utc) > Utc::now() => GateDecision::Allow,
            Ok(_) => self.deny(DenyReason::Expired),
            Err(e) => {
                warn!(expires = %expires, error = %e, "Unparseable session expiry");
                self.deny(DenyReason::NoExpiry)
            }
        }
    }

    fn deny(&self, reason: DenyReason) -> GateDecision {
        debug!(reason = ?reason, "Gate denied request");
        GateDecision::Deny(self.deny_location.clone())
    }
}

fn is_prefetch(headers: &HeaderMap) -> bool {
    headers
        .get(PREFETCH_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "1")
}

/// Middleware applying the gate to protected paths
pub async fn edge_gate(State(gate): State<Arc<EdgeGate>>, request: Request, next: Next) -> Response {
    if !gate.is_protected(request.uri().path()) {
        return next.run(request).await;
    }

    match gate.evaluate(request.method(), request.headers()).await {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Deny(location) => Redirect::temporary(&location).into_response(),
    }
}
