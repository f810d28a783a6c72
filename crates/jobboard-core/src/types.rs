//! Session and credential records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims supplied by the caller when minting a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub subject: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl MintRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            roles: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }
}

/// Payload of a signed API credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClaims {
    /// Subject (identity-provider user id)
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    pub iss: String,
    pub aud: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expires at (unix seconds)
    pub exp: i64,
}

/// A minted API credential together with its validity window
///
/// Derived state of an [`IdentitySession`]: it is replaced wholesale on
/// re-mint, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredential {
    /// Compact signed token
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// An authenticated user's session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySession {
    /// Identity-provider subject; absent for partial sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Avatar URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub expires: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<ApiCredential>,
}

impl IdentitySession {
    pub fn new(subject: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            subject: Some(subject.into()),
            email: None,
            name: None,
            image: None,
            expires,
            credential: None,
        }
    }

    /// A session without a subject (sign-in still in progress)
    pub fn anonymous(expires: DateTime<Utc>) -> Self {
        Self {
            subject: None,
            email: None,
            name: None,
            image: None,
            expires,
            credential: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_credential(mut self, credential: ApiCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = expires;
        self
    }
}

/// User fields visible to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Session shape served to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSession {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_client_session_wire_shape() {
        let client = ClientSession {
            user: SessionUser {
                id: Some("1234".into()),
                email: Some("ada@example.com".into()),
                name: None,
                image: None,
            },
            expires: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap(),
            api_token: Some("abc.def.ghi".into()),
        };

        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["apiToken"], "abc.def.ghi");
        assert_eq!(json["user"]["id"], "1234");
        assert!(json["user"].get("name").is_none());
        assert_eq!(json["expires"], "2030-01-02T03:04:05Z");
    }

    #[test]
    fn test_claims_omit_missing_email() {
        let claims = ApiClaims {
            sub: "u1".into(),
            email: None,
            roles: vec!["user".into()],
            iss: "frontend.next".into(),
            aud: "backend.flask".into(),
            iat: 100,
            exp: 700,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["roles"][0], "user");
    }
}
