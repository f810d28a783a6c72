//! Authoritative session lookup used by the gate

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, COOKIE};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure to confirm a session; the gate treats every variant as a deny
#[derive(Error, Debug)]
pub enum SessionValidationError {
    #[error("Session endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Session endpoint answered {0}")]
    Status(u16),

    #[error("Session endpoint returned malformed body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SessionValidationError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SessionValidationError::Status(status.as_u16())
        } else if err.is_decode() {
            SessionValidationError::Malformed(err.to_string())
        } else {
            SessionValidationError::Unreachable(err.to_string())
        }
    }
}

/// The part of the session response the gate cares about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSnapshot {
    /// ISO-8601 session expiry; absent for unauthenticated sessions
    #[serde(default)]
    pub expires: Option<String>,
}

#[async_trait]
pub trait SessionLookup: Send + Sync {
    /// Ask the identity-session endpoint about the session in `cookie_header`
    async fn lookup(&self, cookie_header: &str) -> Result<SessionSnapshot, SessionValidationError>;
}

/// Looks sessions up over HTTP, forwarding the browser's cookies
pub struct HttpSessionLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSessionLookup {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SessionValidationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SessionLookup for HttpSessionLookup {
    async fn lookup(&self, cookie_header: &str) -> Result<SessionSnapshot, SessionValidationError> {
        debug!(endpoint = %self.endpoint, "Confirming session");
        let snapshot = self
            .client
            .get(&self.endpoint)
            .header(COOKIE, cookie_header)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?
            .error_for_status()?
            .json::<SessionSnapshot>()
            .await?;
        Ok(snapshot)
    }
}
