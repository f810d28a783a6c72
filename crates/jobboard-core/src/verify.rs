//! API credential verification, as performed by the consuming backend

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use crate::types::ApiClaims;

/// Clock tolerance applied to `exp`/`iat` checks
pub const VERIFY_LEEWAY_SECS: u64 = 30;

/// Verifies credentials against the public half of the signing key
pub struct CredentialVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CredentialVerifier {
    /// Build a verifier from a PEM public key (SPKI or PKCS1)
    pub fn from_public_pem(pem: &str, config: &TokenConfig) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::KeyImport(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = VERIFY_LEEWAY_SECS;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Check signature, issuer, audience and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<ApiClaims> {
        let data = decode::<ApiClaims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidCredential("Missing subject claim".into()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const TEST_KEY: &str = include_str!("../testdata/signing_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../testdata/signing_key.pub.pem");

    fn sign(claims: &ApiClaims) -> String {
        let key = EncodingKey::from_rsa_pem(TEST_KEY.as_bytes()).unwrap();
        encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
    }

    fn claims(now: i64) -> ApiClaims {
        ApiClaims {
            sub: "u1".into(),
            email: None,
            roles: vec!["user".into()],
            iss: "frontend.next".into(),
            aud: "backend.flask".into(),
            iat: now,
            exp: now + 600,
        }
    }

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::from_public_pem(TEST_PUBLIC_KEY, &TokenConfig::default()).unwrap()
    }

    #[test]
    fn test_accepts_valid_credential() {
        let now = chrono::Utc::now().timestamp();
        let verified = verifier().verify(&sign(&claims(now))).unwrap();
        assert_eq!(verified.sub, "u1");
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let now = chrono::Utc::now().timestamp();
        let mut c = claims(now);
        c.aud = "backend.photos".into();
        let err = verifier().verify(&sign(&c)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential(_)));
    }

    #[test]
    fn test_rejects_expired_beyond_leeway() {
        let now = chrono::Utc::now().timestamp();
        let mut c = claims(now - 1_000);
        c.exp = now - 31 - 60;
        let err = verifier().verify(&sign(&c)).unwrap_err();
        assert!(matches!(err, AuthError::CredentialExpired));
    }

    #[test]
    fn test_rejects_hs256_token() {
        let now = chrono::Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims(now),
            &EncodingKey::from_secret(b"shared"),
        )
        .unwrap();
        assert!(verifier().verify(&token).is_err());
    }
}
