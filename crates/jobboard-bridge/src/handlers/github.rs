//! GitHub OAuth profile handler
//!
//! GitHub may hide the primary address. The handshake requests
//! `user:email`, and the verified addresses arrive as `emails[].value`; the
//! first one is used when `email` is null.

use serde_json::Value;

use crate::bridge::{string_field, ProfileHandler};
use crate::error::{BridgeError, Result};
use crate::types::{ProviderKind, VerifiedIdentity};

#[derive(Debug, Default, Clone)]
pub struct GitHubHandler;

impl GitHubHandler {
    pub fn new() -> Self {
        Self
    }

    fn subject(profile: &Value) -> Result<Option<String>> {
        match profile.get("id") {
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            _ => string_field(profile, "id"),
        }
    }

    fn email(profile: &Value) -> Result<Option<String>> {
        if let Some(email) = string_field(profile, "email")? {
            return Ok(Some(email));
        }

        let first = profile
            .get("emails")
            .and_then(Value::as_array)
            .and_then(|emails| emails.first());

        match first {
            Some(entry) => string_field(entry, "value"),
            None => Ok(None),
        }
    }
}

impl ProfileHandler for GitHubHandler {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn description(&self) -> &str {
        "GitHub OAuth handler"
    }

    fn verify(&self, profile: &Value) -> Result<VerifiedIdentity> {
        if !profile.is_object() {
            return Err(BridgeError::InvalidProfile("profile is not an object".into()));
        }

        let subject = Self::subject(profile)?
            .ok_or_else(|| BridgeError::MissingSubject(self.provider().to_string()))?;
        let email = Self::email(profile)?
            .ok_or_else(|| BridgeError::MissingEmail(self.provider().to_string()))?;

        let mut identity = VerifiedIdentity::new(self.provider(), subject, email);
        let name = match string_field(profile, "name")? {
            Some(name) => Some(name),
            None => string_field(profile, "login")?,
        };
        if let Some(name) = name {
            identity = identity.with_name(name);
        }
        if let Some(avatar) = string_field(profile, "avatar_url")? {
            identity = identity.with_image(avatar);
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_id_and_public_email() {
        let identity = GitHubHandler::new()
            .verify(&json!({
                "id": 583231,
                "login": "octocat",
                "name": "The Octocat",
                "email": "octocat@github.com",
                "avatar_url": "https://avatars.githubusercontent.com/u/583231"
            }))
            .unwrap();

        assert_eq!(identity.subject, "583231");
        assert_eq!(identity.email, "octocat@github.com");
        assert_eq!(identity.name.as_deref(), Some("The Octocat"));
    }

    #[test]
    fn test_hidden_email_falls_back_to_emails_list() {
        let identity = GitHubHandler::new()
            .verify(&json!({
                "id": 1,
                "login": "hidden",
                "name": null,
                "email": null,
                "emails": [{ "value": "hidden@users.noreply.github.com" }]
            }))
            .unwrap();

        assert_eq!(identity.email, "hidden@users.noreply.github.com");
        assert_eq!(identity.name.as_deref(), Some("hidden"));
    }

    #[test]
    fn test_no_email_anywhere_refused() {
        let err = GitHubHandler::new()
            .verify(&json!({ "id": 2, "login": "ghost", "email": null, "emails": [] }))
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingEmail(p) if p == "github"));
    }
}
