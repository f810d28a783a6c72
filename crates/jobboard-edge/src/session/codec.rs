//! Session cookie codec
//!
//! The identity session travels in the cookie as an HS256 token signed with
//! the server's session secret. Field mapping is explicit so a tampered or
//! stale layout is rejected at the boundary.

use chrono::{DateTime, TimeZone, Utc};
use jobboard_core::{ApiCredential, IdentitySession};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionError;

/// Wire layout of the session cookie
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    #[serde(rename = "apiToken", default, skip_serializing_if = "Option::is_none")]
    api_token: Option<String>,
    #[serde(rename = "apiTokenIat", default, skip_serializing_if = "Option::is_none")]
    api_token_iat: Option<i64>,
    #[serde(rename = "apiTokenExp", default, skip_serializing_if = "Option::is_none")]
    api_token_exp: Option<i64>,
    jti: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session cookies
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Serialize a session; its `expires` becomes the cookie token's `exp`
    pub fn encode(&self, session: &IdentitySession) -> Result<String, SessionError> {
        let credential = session.credential.as_ref();
        let claims = SessionClaims {
            sub: session.subject.clone(),
            email: session.email.clone(),
            name: session.name.clone(),
            picture: session.image.clone(),
            api_token: credential.map(|c| c.token.clone()),
            api_token_iat: credential.map(|c| c.issued_at),
            api_token_exp: credential.map(|c| c.expires_at),
            jti: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp(),
            exp: session.expires.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Encode(e.to_string()))
    }

    /// Verify and parse a session cookie
    pub fn decode(&self, token: &str) -> Result<IdentitySession, SessionError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| SessionError::InvalidCookie(e.to_string()))?
            .claims;

        let expires = timestamp(claims.exp)?;

        // A credential is only usable with its full window recorded
        let credential = match (claims.api_token, claims.api_token_iat, claims.api_token_exp) {
            (Some(token), Some(issued_at), Some(expires_at)) => Some(ApiCredential {
                token,
                issued_at,
                expires_at,
            }),
            _ => None,
        };

        Ok(IdentitySession {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
            image: claims.picture,
            expires,
            credential,
        })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, SessionError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| SessionError::InvalidCookie(format!("bad timestamp {}", secs)))
}
