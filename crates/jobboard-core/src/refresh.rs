//! Session refresh pipeline
//!
//! Two stages run in a fixed order on every session read or write:
//!
//! 1. **enrich** decides whether the session's API credential is still usable
//!    and re-mints it when it is missing or inside the skew window.
//! 2. **expose** projects the enriched record onto the browser-visible shape.
//!
//! Each stage takes a record and returns a new one. [`SessionPipeline::run`]
//! is the only composition, so the exposed session always carries the
//! credential produced by the enrich stage of the same cycle.
//!
//! Freshness is evaluated only here. A credential handed out by the pipeline
//! has at least `skew_secs` of validity left at read time, and no more is
//! promised.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::TokenConfig;
use crate::error::Result;
use crate::mint::CredentialIssuer;
use crate::types::{ApiCredential, ClientSession, IdentitySession, MintRequest, SessionUser};

/// Freshness of a session's API credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// No credential has been minted yet
    NoToken,
    /// At least `skew` seconds of validity remain
    Valid,
    /// Still valid, but inside the skew window
    Expiring,
    /// Past its expiry
    Expired,
}

impl CredentialState {
    /// Classify a credential at time `now`
    pub fn evaluate(credential: Option<&ApiCredential>, now: i64, skew_secs: i64) -> Self {
        match credential {
            None => CredentialState::NoToken,
            Some(c) if c.expires_at <= now => CredentialState::Expired,
            Some(c) if c.expires_at - skew_secs < now => CredentialState::Expiring,
            Some(_) => CredentialState::Valid,
        }
    }

    pub fn needs_mint(self) -> bool {
        !matches!(self, CredentialState::Valid)
    }
}

/// Result of one full pipeline run
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Enriched record, to be persisted by the session store
    pub session: IdentitySession,
    /// Browser-visible projection of `session`
    pub client: ClientSession,
    /// Whether a new credential was minted in this cycle
    pub reminted: bool,
}

/// Ordered enrich → expose pipeline
pub struct SessionPipeline {
    issuer: Arc<dyn CredentialIssuer>,
    clock: Arc<dyn Clock>,
    skew_secs: i64,
    roles: Vec<String>,
}

impl SessionPipeline {
    pub fn new(issuer: Arc<dyn CredentialIssuer>, config: &TokenConfig) -> Self {
        Self {
            issuer,
            clock: Arc::new(SystemClock),
            skew_secs: config.skew_secs,
            roles: config.roles.clone(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run enrich then expose
    pub async fn run(&self, session: IdentitySession) -> Result<RefreshOutcome> {
        let before = session.credential.clone();
        let session = self.enrich(session).await?;
        let reminted = session.credential != before;
        let client = self.expose(&session);

        Ok(RefreshOutcome {
            session,
            client,
            reminted,
        })
    }

    /// Re-mint the credential when it is missing or inside the skew window
    ///
    /// Sessions without a subject pass through untouched. Mint failures are
    /// returned as-is; the caller must not fall back to the old credential.
    pub async fn enrich(&self, session: IdentitySession) -> Result<IdentitySession> {
        let Some(subject) = session.subject.as_deref() else {
            debug!("Session has no subject, skipping credential refresh");
            return Ok(session);
        };

        let now = self.clock.now();
        let state = CredentialState::evaluate(session.credential.as_ref(), now, self.skew_secs);
        if !state.needs_mint() {
            return Ok(session);
        }

        let request = MintRequest::new(subject)
            .with_email(session.email.clone())
            .with_roles(self.roles.clone());

        let credential = self.issuer.mint(&request).await.inspect_err(|e| {
            warn!(sub = %subject, state = ?state, error = %e, "Credential refresh failed");
        })?;

        info!(
            sub = %subject,
            state = ?state,
            exp = credential.expires_at,
            "Refreshed API credential"
        );

        Ok(IdentitySession {
            credential: Some(credential),
            ..session
        })
    }

    /// Copy the credential and subject onto the browser-visible session
    ///
    /// No freshness logic: callers go through [`run`](Self::run) so enrich
    /// has already happened in this cycle.
    pub fn expose(&self, session: &IdentitySession) -> ClientSession {
        ClientSession {
            user: SessionUser {
                id: session.subject.clone(),
                email: session.email.clone(),
                name: session.name.clone(),
                image: session.image.clone(),
            },
            expires: session.expires,
            api_token: session.credential.as_ref().map(|c| c.token.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::AuthError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    /// Issuer that records requests and stamps credentials with the clock
    struct RecordingIssuer {
        clock: Arc<ManualClock>,
        requests: Mutex<Vec<MintRequest>>,
        fail: bool,
    }

    impl RecordingIssuer {
        fn new(clock: Arc<ManualClock>) -> Self {
            Self {
                clock,
                requests: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CredentialIssuer for RecordingIssuer {
        async fn mint(&self, request: &MintRequest) -> Result<ApiCredential> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(AuthError::TokenMint("hsm offline".into()));
            }
            let now = self.clock.now();
            Ok(ApiCredential {
                token: format!("token-{}-{}", request.subject, now),
                issued_at: now,
                expires_at: now + 600,
            })
        }
    }

    fn setup(now: i64) -> (Arc<ManualClock>, Arc<RecordingIssuer>, SessionPipeline) {
        let clock = Arc::new(ManualClock::new(now));
        let issuer = Arc::new(RecordingIssuer::new(clock.clone()));
        let pipeline = SessionPipeline::new(issuer.clone(), &TokenConfig::default())
            .with_clock(clock.clone());
        (clock, issuer, pipeline)
    }

    fn session() -> IdentitySession {
        IdentitySession::new("github-42", Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap())
            .with_email("grace@example.com")
            .with_name("Grace")
    }

    #[test]
    fn test_state_classification() {
        let c = ApiCredential {
            token: "t".into(),
            issued_at: 0,
            expires_at: 600,
        };
        assert_eq!(CredentialState::evaluate(None, 0, 60), CredentialState::NoToken);
        assert_eq!(CredentialState::evaluate(Some(&c), 540, 60), CredentialState::Valid);
        assert_eq!(CredentialState::evaluate(Some(&c), 541, 60), CredentialState::Expiring);
        assert_eq!(CredentialState::evaluate(Some(&c), 600, 60), CredentialState::Expired);
        assert!(!CredentialState::Valid.needs_mint());
        assert!(CredentialState::Expiring.needs_mint());
    }

    #[tokio::test]
    async fn test_first_read_mints_with_user_role() {
        let (_, issuer, pipeline) = setup(1_000);

        let outcome = pipeline.run(session()).await.unwrap();
        assert!(outcome.reminted);

        let credential = outcome.session.credential.clone().unwrap();
        assert_eq!(credential.expires_at, 1_600);
        assert_eq!(outcome.client.api_token.as_deref(), Some(credential.token.as_str()));
        assert_eq!(outcome.client.user.id.as_deref(), Some("github-42"));

        let requests = issuer.requests.lock().unwrap();
        assert_eq!(requests[0].subject, "github-42");
        assert_eq!(requests[0].email.as_deref(), Some("grace@example.com"));
        assert_eq!(requests[0].roles, vec!["user"]);
    }

    #[tokio::test]
    async fn test_valid_credential_is_left_untouched() {
        let (clock, issuer, pipeline) = setup(1_000);
        let first = pipeline.run(session()).await.unwrap().session;

        // 1_540 is exactly expiry minus skew: still valid
        clock.set(1_540);
        let outcome = pipeline.run(first.clone()).await.unwrap();

        assert!(!outcome.reminted);
        assert_eq!(outcome.session, first);
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn test_expiring_credential_is_reminted() {
        let (clock, issuer, pipeline) = setup(1_000);
        let first = pipeline.run(session()).await.unwrap().session;
        let old = first.credential.clone().unwrap();

        clock.set(1_541);
        let outcome = pipeline.run(first).await.unwrap();
        let new = outcome.session.credential.unwrap();

        assert!(outcome.reminted);
        assert!(new.issued_at > old.issued_at);
        assert_eq!(new.expires_at, 2_141);
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn test_session_without_subject_is_passed_through() {
        let (_, issuer, pipeline) = setup(1_000);
        let anonymous = IdentitySession::anonymous(Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap());

        let enriched = pipeline.enrich(anonymous.clone()).await.unwrap();
        assert_eq!(enriched, anonymous);
        assert_eq!(issuer.calls(), 0);
    }

    #[tokio::test]
    async fn test_mint_failure_does_not_keep_stale_credential() {
        let clock = Arc::new(ManualClock::new(5_000));
        let mut issuer = RecordingIssuer::new(clock.clone());
        issuer.fail = true;
        let pipeline = SessionPipeline::new(Arc::new(issuer), &TokenConfig::default())
            .with_clock(clock);

        let stale = session().with_credential(ApiCredential {
            token: "old".into(),
            issued_at: 1_000,
            expires_at: 1_600,
        });

        let err = pipeline.run(stale).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenMint(_)));
    }
}
