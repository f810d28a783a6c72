//! Token configuration
//!
//! Issuer, audience and key id are fixed by the backend contract. TTL and
//! skew are tunable.

use crate::error::{AuthError, Result};

/// Issuer written into every API credential
pub const DEFAULT_ISSUER: &str = "frontend.next";

/// Audience written into every API credential
pub const DEFAULT_AUDIENCE: &str = "backend.flask";

/// Key identifier placed in the token header
pub const DEFAULT_KEY_ID: &str = "main";

/// Credential lifetime in seconds
pub const DEFAULT_TTL_SECS: i64 = 10 * 60;

/// Safety margin subtracted from expiry when deciding whether to re-mint
pub const DEFAULT_SKEW_SECS: i64 = 60;

/// Longest credential lifetime accepted from configuration
pub const MAX_TTL_SECS: i64 = 24 * 60 * 60;

/// Parameters for minting and refreshing API credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub key_id: String,
    pub ttl_secs: i64,
    pub skew_secs: i64,
    /// Roles granted to every signed-in user
    pub roles: Vec<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            key_id: DEFAULT_KEY_ID.to_string(),
            ttl_secs: DEFAULT_TTL_SECS,
            skew_secs: DEFAULT_SKEW_SECS,
            roles: vec!["user".to_string()],
        }
    }
}

impl TokenConfig {
    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_skew_secs(mut self, skew_secs: i64) -> Self {
        self.skew_secs = skew_secs;
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Check that the skew leaves a usable validity window
    ///
    /// A skew at or above the TTL would re-mint on every session read.
    pub fn validate(&self) -> Result<()> {
        if self.skew_secs < 0 {
            return Err(AuthError::InvalidConfig("skew must not be negative".into()));
        }
        if self.ttl_secs <= self.skew_secs {
            return Err(AuthError::InvalidConfig(format!(
                "ttl ({}s) must exceed skew ({}s)",
                self.ttl_secs, self.skew_secs
            )));
        }
        if self.ttl_secs > MAX_TTL_SECS {
            return Err(AuthError::InvalidConfig(format!(
                "ttl ({}s) must not exceed {}s",
                self.ttl_secs, MAX_TTL_SECS
            )));
        }
        Ok(())
    }
}
