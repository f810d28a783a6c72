//! Google OpenID Connect profile handler
//!
//! The handshake requests `openid email profile`, so the profile is the
//! standard OIDC userinfo document.

use serde_json::Value;

use crate::bridge::{string_field, ProfileHandler};
use crate::error::{BridgeError, Result};
use crate::types::{ProviderKind, VerifiedIdentity};

#[derive(Debug, Default, Clone)]
pub struct GoogleHandler;

impl GoogleHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ProfileHandler for GoogleHandler {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn description(&self) -> &str {
        "Google OIDC handler"
    }

    fn verify(&self, profile: &Value) -> Result<VerifiedIdentity> {
        if !profile.is_object() {
            return Err(BridgeError::InvalidProfile("profile is not an object".into()));
        }

        let subject = string_field(profile, "sub")?
            .ok_or_else(|| BridgeError::MissingSubject(self.provider().to_string()))?;
        let email = string_field(profile, "email")?
            .ok_or_else(|| BridgeError::MissingEmail(self.provider().to_string()))?;

        let mut identity = VerifiedIdentity::new(self.provider(), subject, email);
        if let Some(name) = string_field(profile, "name")? {
            identity = identity.with_name(name);
        }
        if let Some(picture) = string_field(profile, "picture")? {
            identity = identity.with_image(picture);
        }

        Ok(identity)
    }
}
