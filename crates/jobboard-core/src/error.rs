//! Error types for credential minting and verification

use thiserror::Error;

/// Result type alias using AuthError
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while minting, refreshing or verifying API credentials
#[derive(Error, Debug)]
pub enum AuthError {
    /// Signing key material is missing or malformed
    #[error("Key import failed: {0}")]
    KeyImport(String),

    /// The signing operation itself failed
    #[error("Token mint failed: {0}")]
    TokenMint(String),

    /// Credential failed signature, issuer, audience or format checks
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Credential is past its expiry
    #[error("Credential expired")]
    CredentialExpired,

    /// Token configuration is inconsistent
    #[error("Invalid token configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Whether this error came from the key provider
    pub fn is_key_import(&self) -> bool {
        matches!(self, AuthError::KeyImport(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::CredentialExpired,
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                AuthError::KeyImport(err.to_string())
            }
            ErrorKind::Json(_) => AuthError::Serialization(err.to_string()),
            _ => AuthError::InvalidCredential(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Serialization(err.to_string())
    }
}
