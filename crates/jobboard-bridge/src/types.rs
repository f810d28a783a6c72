//! Core types for the identity bridge

use serde::{Deserialize, Serialize};

/// Supported identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    GitHub,
    /// Mock provider (for testing)
    Mock,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Google => write!(f, "google"),
            ProviderKind::GitHub => write!(f, "github"),
            ProviderKind::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "github" => Ok(ProviderKind::GitHub),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(format!("Unknown identity provider: {}", s)),
        }
    }
}

/// An identity accepted at sign-in
///
/// Produced from the provider's profile once the OAuth handshake has
/// completed; becomes the subject and user fields of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub provider: ProviderKind,

    /// Provider-scoped stable user id
    pub subject: String,

    /// Always present: sign-in is refused without one
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl VerifiedIdentity {
    pub fn new(provider: ProviderKind, subject: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            provider,
            subject: subject.into(),
            email: email.into(),
            name: None,
            image: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
