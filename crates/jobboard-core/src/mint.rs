//! API credential minting
//!
//! Produces RS256 tokens scoped to the backend audience. Every call signs a
//! fresh token; caching is the session pipeline's job.

use async_trait::async_trait;
use jsonwebtoken::{encode, Header};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use crate::keys::KeyProvider;
use crate::types::{ApiClaims, ApiCredential, MintRequest};

/// Anything that can turn a mint request into a signed credential
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn mint(&self, request: &MintRequest) -> Result<ApiCredential>;
}

/// Signs API credentials with the provider's key
pub struct TokenMinter {
    keys: Arc<KeyProvider>,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl TokenMinter {
    pub fn new(keys: Arc<KeyProvider>, config: TokenConfig) -> Self {
        Self {
            keys,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Build the payload for a request issued at `issued_at`
    pub fn claims_for(&self, request: &MintRequest, issued_at: i64) -> Result<ApiClaims> {
        let exp = issued_at.checked_add(self.config.ttl_secs).ok_or_else(|| {
            AuthError::TokenMint(format!(
                "expiry out of range (iat {}, ttl {}s)",
                issued_at, self.config.ttl_secs
            ))
        })?;

        Ok(ApiClaims {
            sub: request.subject.clone(),
            email: request.email.clone(),
            roles: request.roles.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: issued_at,
            exp,
        })
    }
}

#[async_trait]
impl CredentialIssuer for TokenMinter {
    async fn mint(&self, request: &MintRequest) -> Result<ApiCredential> {
        let key = self.keys.signing_key().await?;

        let claims = self.claims_for(request, self.clock.now())?;
        let (issued_at, expires_at) = (claims.iat, claims.exp);

        let mut header = Header::new(key.algorithm());
        header.kid = Some(key.kid().to_string());

        // RSA signing is CPU bound; keep it off the reactor.
        let signer = Arc::clone(&key);
        let token = tokio::task::spawn_blocking(move || {
            encode(&header, &claims, signer.encoding_key())
        })
        .await
        .map_err(|e| AuthError::TokenMint(format!("signing task failed: {}", e)))?
        .map_err(|e| {
            warn!(sub = %request.subject, error = %e, "Failed to sign API credential");
            AuthError::TokenMint(e.to_string())
        })?;

        debug!(
            sub = %request.subject,
            kid = %key.kid(),
            iat = issued_at,
            exp = expires_at,
            "Minted API credential"
        );

        Ok(ApiCredential {
            token,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

    const TEST_KEY: &str = include_str!("../testdata/signing_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../testdata/signing_key.pub.pem");

    fn minter_at(now: i64) -> TokenMinter {
        let keys = Arc::new(KeyProvider::from_pem(TEST_KEY, "main"));
        TokenMinter::new(keys, TokenConfig::default()).with_clock(Arc::new(ManualClock::new(now)))
    }

    #[tokio::test]
    async fn test_mint_sets_window_and_header() {
        let minter = minter_at(1_700_000_000);
        let request = MintRequest::new("google-1234")
            .with_email(Some("ada@example.com".into()))
            .with_roles(vec!["user".into()]);

        let credential = minter.mint(&request).await.unwrap();
        assert_eq!(credential.issued_at, 1_700_000_000);
        assert_eq!(credential.expires_at - credential.issued_at, 600);

        let header = decode_header(&credential.token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("main"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["backend.flask"]);
        validation.set_issuer(&["frontend.next"]);
        validation.validate_exp = false;
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let claims = decode::<ApiClaims>(&credential.token, &key, &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.sub, "google-1234");
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert_eq!(claims.roles, vec!["user"]);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_600);
    }

    #[tokio::test]
    async fn test_mint_respects_configured_ttl() {
        let keys = Arc::new(KeyProvider::from_pem(TEST_KEY, "main"));
        let minter = TokenMinter::new(keys, TokenConfig::default().with_ttl_secs(120))
            .with_clock(Arc::new(ManualClock::new(50)));

        let credential = minter.mint(&MintRequest::new("u")).await.unwrap();
        assert_eq!(credential.expires_at, 170);
    }

    #[tokio::test]
    async fn test_mint_is_not_cached() {
        let clock = Arc::new(ManualClock::new(1_000));
        let keys = Arc::new(KeyProvider::from_pem(TEST_KEY, "main"));
        let minter = TokenMinter::new(keys, TokenConfig::default()).with_clock(clock.clone());

        let first = minter.mint(&MintRequest::new("u")).await.unwrap();
        clock.advance(1);
        let second = minter.mint(&MintRequest::new("u")).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(second.issued_at, first.issued_at + 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_a_mint_error() {
        let keys = Arc::new(KeyProvider::from_pem(TEST_KEY, "main"));
        let minter = TokenMinter::new(keys, TokenConfig::default().with_ttl_secs(i64::MAX))
            .with_clock(Arc::new(ManualClock::new(1_700_000_000)));

        let err = minter.mint(&MintRequest::new("u")).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenMint(_)));
    }

    #[tokio::test]
    async fn test_key_failure_propagates() {
        let keys = Arc::new(KeyProvider::from_pem("garbage", "main"));
        let minter = TokenMinter::new(keys, TokenConfig::default());

        let err = minter.mint(&MintRequest::new("u")).await.unwrap_err();
        assert!(err.is_key_import());
    }
}
