//! Mock profile handler
//!
//! Accepts `{ "sub": ..., "email": ..., "name"?: ..., "image"?: ... }`.
//! For local development and tests only.

use serde_json::Value;

use crate::bridge::{string_field, ProfileHandler};
use crate::error::{BridgeError, Result};
use crate::types::{ProviderKind, VerifiedIdentity};

#[derive(Debug, Default, Clone)]
pub struct MockHandler;

impl MockHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ProfileHandler for MockHandler {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    fn description(&self) -> &str {
        "mock handler"
    }

    fn verify(&self, profile: &Value) -> Result<VerifiedIdentity> {
        let subject = string_field(profile, "sub")?
            .ok_or_else(|| BridgeError::MissingSubject("mock".into()))?;
        let email = string_field(profile, "email")?
            .ok_or_else(|| BridgeError::MissingEmail("mock".into()))?;

        let mut identity = VerifiedIdentity::new(ProviderKind::Mock, subject, email);
        if let Some(name) = string_field(profile, "name")? {
            identity = identity.with_name(name);
        }
        if let Some(image) = string_field(profile, "image")? {
            identity = identity.with_image(image);
        }
        Ok(identity)
    }
}
