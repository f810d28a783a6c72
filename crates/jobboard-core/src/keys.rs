//! Signing key provider
//!
//! Loads the RS256 private key once and hands the same handle to every
//! caller for the lifetime of the provider. Concurrent first calls wait on
//! the single in-flight import. A failed import leaves the provider empty so
//! the next call retries.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{AuthError, Result};

/// Environment variable holding the PKCS8 PEM private key
pub const PRIVATE_KEY_ENV: &str = "API_JWT_PRIVATE_KEY";

/// Where PEM key material comes from
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the PEM-encoded private key
    async fn load(&self) -> Result<String>;

    /// Short description for logging
    fn description(&self) -> &str {
        "key source"
    }
}

/// Reads key material from an environment variable
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(PRIVATE_KEY_ENV)
    }
}

#[async_trait]
impl KeySource for EnvKeySource {
    async fn load(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            Ok(_) => Err(AuthError::KeyImport(format!("{} is empty", self.var))),
            Err(_) => Err(AuthError::KeyImport(format!("{} is not set", self.var))),
        }
    }

    fn description(&self) -> &str {
        &self.var
    }
}

/// Key material held in memory
#[derive(Clone)]
pub struct PemKeySource {
    pem: String,
}

impl PemKeySource {
    pub fn new(pem: impl Into<String>) -> Self {
        Self { pem: pem.into() }
    }
}

#[async_trait]
impl KeySource for PemKeySource {
    async fn load(&self) -> Result<String> {
        Ok(self.pem.clone())
    }

    fn description(&self) -> &str {
        "inline pem"
    }
}

/// Imported private key plus the key id advertised in token headers
pub struct SigningKey {
    kid: String,
    encoding_key: EncodingKey,
}

impl SigningKey {
    /// Parse a PKCS8 (or PKCS1) PEM RSA private key
    ///
    /// A probe signature is produced so that structurally broken keys fail
    /// here rather than at first mint.
    pub fn from_pem(kid: impl Into<String>, pem: &str) -> Result<Self> {
        let pem = normalize_pem(pem);
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::KeyImport(e.to_string()))?;

        encode(
            &Header::new(Algorithm::RS256),
            &serde_json::json!({ "probe": true }),
            &encoding_key,
        )
        .map_err(|e| AuthError::KeyImport(format!("key cannot sign: {}", e)))?;

        Ok(Self {
            kid: kid.into(),
            encoding_key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("alg", &"RS256")
            .finish_non_exhaustive()
    }
}

/// Environment values often carry the PEM with literal `\n` sequences
fn normalize_pem(pem: &str) -> String {
    pem.trim().replace("\\n", "\n")
}

/// Initialize-once owner of the signing key
pub struct KeyProvider {
    source: Arc<dyn KeySource>,
    kid: String,
    key: OnceCell<Arc<SigningKey>>,
}

impl KeyProvider {
    pub fn new(source: Arc<dyn KeySource>, kid: impl Into<String>) -> Self {
        Self {
            source,
            kid: kid.into(),
            key: OnceCell::new(),
        }
    }

    /// Provider backed by [`PRIVATE_KEY_ENV`]
    pub fn from_env(kid: impl Into<String>) -> Self {
        Self::new(Arc::new(EnvKeySource::default()), kid)
    }

    /// Provider backed by an in-memory PEM string
    pub fn from_pem(pem: impl Into<String>, kid: impl Into<String>) -> Self {
        Self::new(Arc::new(PemKeySource::new(pem)), kid)
    }

    /// Get the signing key, importing it on first use
    pub async fn signing_key(&self) -> Result<Arc<SigningKey>> {
        if let Some(key) = self.key.get() {
            return Ok(Arc::clone(key));
        }

        let key = self.key.get_or_try_init(|| self.import()).await?;
        Ok(Arc::clone(key))
    }

    /// Whether the key has been imported
    pub fn is_loaded(&self) -> bool {
        self.key.initialized()
    }

    async fn import(&self) -> Result<Arc<SigningKey>> {
        debug!(source = self.source.description(), "Importing signing key");

        let pem = self.source.load().await.inspect_err(|e| {
            warn!(source = self.source.description(), error = %e, "Signing key unavailable");
        })?;

        let key = SigningKey::from_pem(&self.kid, &pem).inspect_err(|e| {
            warn!(source = self.source.description(), error = %e, "Signing key rejected");
        })?;

        info!(kid = %self.kid, "Signing key imported");
        Ok(Arc::new(key))
    }
}
