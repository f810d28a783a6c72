//! Error types for the identity bridge

use thiserror::Error;

/// Result type for identity bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Reasons a provider profile is refused at sign-in
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Profile carries no usable email address
    #[error("Sign-in refused: {0} profile has no email address")]
    MissingEmail(String),

    /// Profile carries no stable subject identifier
    #[error("Sign-in refused: {0} profile has no subject")]
    MissingSubject(String),

    /// No handler registered for the provider
    #[error("Unknown identity provider: {0}")]
    UnknownProvider(String),

    /// Profile is not a JSON object or has fields of the wrong type
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::InvalidProfile(err.to_string())
    }
}
