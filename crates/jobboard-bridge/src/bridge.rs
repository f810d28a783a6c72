//! Identity bridge - routes provider profiles to handlers

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{BridgeError, Result};
use crate::types::{ProviderKind, VerifiedIdentity};

/// Trait for profile handlers
///
/// Each handler understands one provider's profile shape and decides
/// whether the profile is acceptable for sign-in.
pub trait ProfileHandler: Send + Sync {
    /// The provider this handler processes
    fn provider(&self) -> ProviderKind;

    /// Normalise a raw profile, refusing it when required fields are missing
    ///
    /// # Arguments
    /// * `profile` - Provider profile as returned by the OAuth exchange
    ///
    /// # Returns
    /// * `Ok(VerifiedIdentity)` - Identity allowed to sign in
    /// * `Err(BridgeError)` - If the profile lacks a subject or email
    fn verify(&self, profile: &Value) -> Result<VerifiedIdentity>;

    /// Get a description of this handler (for logging)
    fn description(&self) -> &str {
        "profile handler"
    }
}

/// Routes profiles to the handler registered for their provider
///
/// Providers without a registered handler cannot sign in.
pub struct IdentityBridge {
    handlers: HashMap<ProviderKind, Arc<dyn ProfileHandler>>,
}

impl IdentityBridge {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a profile handler
    pub fn register_handler<H: ProfileHandler + 'static>(&mut self, handler: H) {
        let provider = handler.provider();
        info!(
            provider = %provider,
            description = handler.description(),
            "Registered profile handler"
        );
        self.handlers.insert(provider, Arc::new(handler));
    }

    pub fn has_handler(&self, provider: ProviderKind) -> bool {
        self.handlers.contains_key(&provider)
    }

    pub fn providers(&self) -> Vec<ProviderKind> {
        self.handlers.keys().copied().collect()
    }

    /// Decide whether a profile may sign in
    ///
    /// # Arguments
    /// * `provider` - Provider that produced the profile
    /// * `profile` - Raw provider profile
    ///
    /// # Returns
    /// * `Ok(VerifiedIdentity)` - Normalised identity for the session
    /// * `Err(BridgeError)` - If no handler is registered or the profile is refused
    pub fn sign_in(&self, provider: ProviderKind, profile: &Value) -> Result<VerifiedIdentity> {
        let handler = self.handlers.get(&provider).ok_or_else(|| {
            warn!(provider = %provider, "No handler for identity provider");
            BridgeError::UnknownProvider(provider.to_string())
        })?;

        let result = handler.verify(profile);

        match &result {
            Ok(identity) => {
                info!(provider = %provider, sub = %identity.subject, "Sign-in accepted");
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "Sign-in refused");
            }
        }

        result
    }
}

impl Default for IdentityBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating an IdentityBridge with handlers
pub struct IdentityBridgeBuilder {
    bridge: IdentityBridge,
}

impl IdentityBridgeBuilder {
    pub fn new() -> Self {
        Self {
            bridge: IdentityBridge::new(),
        }
    }

    pub fn with_handler<H: ProfileHandler + 'static>(mut self, handler: H) -> Self {
        self.bridge.register_handler(handler);
        self
    }

    pub fn build(self) -> IdentityBridge {
        self.bridge
    }
}

impl Default for IdentityBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an optional string field, rejecting non-string values
pub(crate) fn string_field(profile: &Value, field: &str) -> Result<Option<String>> {
    match profile.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(BridgeError::InvalidProfile(format!(
            "field '{}' should be a string, got {}",
            field, other
        ))),
    }
}
