//! Identity session store
//!
//! Sessions live in a signed cookie. Every read goes through the refresh
//! pipeline and produces a re-issued cookie, so the stored credential and
//! the one handed to the browser always come from the same cycle.

pub mod codec;
pub mod cookie;

use chrono::{Duration, Utc};
use jobboard_bridge::VerifiedIdentity;
use jobboard_core::{AuthError, IdentitySession, RefreshOutcome, SessionPipeline};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub use codec::SessionCodec;
pub use cookie::{session_token, CookieSettings, SECURE_SESSION_COOKIE, SESSION_COOKIE};

#[derive(Error, Debug)]
pub enum SessionError {
    /// Cookie is missing fields, expired, or signed with another secret
    #[error("Invalid session cookie: {0}")]
    InvalidCookie(String),

    #[error("Failed to encode session: {0}")]
    Encode(String),

    /// Credential re-mint failed; the session has no usable credential
    #[error(transparent)]
    Refresh(#[from] AuthError),
}

/// A refreshed session and the cookie that persists it
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub outcome: RefreshOutcome,
    /// Token to store in the session cookie
    pub cookie_value: String,
}

pub struct SessionService {
    codec: SessionCodec,
    pipeline: Arc<SessionPipeline>,
    cookies: CookieSettings,
}

impl SessionService {
    pub fn new(codec: SessionCodec, pipeline: Arc<SessionPipeline>, cookies: CookieSettings) -> Self {
        Self {
            codec,
            pipeline,
            cookies,
        }
    }

    pub fn cookies(&self) -> &CookieSettings {
        &self.cookies
    }

    fn next_expiry(&self) -> Result<chrono::DateTime<Utc>, SessionError> {
        Duration::try_seconds(self.cookies.max_age_secs)
            .and_then(|max_age| Utc::now().checked_add_signed(max_age))
            .ok_or_else(|| {
                SessionError::Encode(format!(
                    "session max age {}s is out of range",
                    self.cookies.max_age_secs
                ))
            })
    }

    /// Start a session for an identity accepted at sign-in
    pub async fn establish(&self, identity: &VerifiedIdentity) -> Result<ActiveSession, SessionError> {
        let mut session = IdentitySession::new(identity.subject.clone(), self.next_expiry()?)
            .with_email(identity.email.clone());
        session.name = identity.name.clone();
        session.image = identity.image.clone();

        let active = self.persist(session).await?;
        info!(
            provider = %identity.provider,
            sub = %identity.subject,
            "Session established"
        );
        Ok(active)
    }

    /// Read a session cookie, refreshing expiry and credential
    ///
    /// Returns `Ok(None)` when the cookie is not a valid session.
    pub async fn refresh(&self, cookie_value: &str) -> Result<Option<ActiveSession>, SessionError> {
        let session = match self.codec.decode(cookie_value) {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "Ignoring unusable session cookie");
                return Ok(None);
            }
        };

        let session = session.with_expires(self.next_expiry()?);
        self.persist(session).await.map(Some)
    }

    async fn persist(&self, session: IdentitySession) -> Result<ActiveSession, SessionError> {
        let outcome = self.pipeline.run(session).await?;
        let cookie_value = self.codec.encode(&outcome.session)?;
        Ok(ActiveSession {
            outcome,
            cookie_value,
        })
    }
}
