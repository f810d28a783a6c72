//! Server configuration, read from the environment

use jobboard_core::config::{DEFAULT_SKEW_SECS, DEFAULT_TTL_SECS};
use jobboard_core::{AuthError, TokenConfig};
use thiserror::Error;

/// Default login-required page the gate redirects to
pub const DEFAULT_LOGIN_PATH: &str = "/loginRequired";

/// Where the browser lands after signing in from a denied request
pub const DEFAULT_CALLBACK_URL: &str = "/";

/// Pages that require a signed-in session
pub const DEFAULT_PROTECTED_PATHS: [&str; 2] = ["/jobs", "/newJob"];

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;
const MAX_SESSION_MAX_AGE_SECS: i64 = 10 * 365 * 24 * 60 * 60;
const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: String, reason: String },

    #[error(transparent)]
    Token(#[from] AuthError),
}

/// Edge server configuration
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub port: u16,
    /// Secret for the session cookie signature
    pub session_secret: String,
    pub session_max_age_secs: i64,
    /// Issue `__Secure-` prefixed cookies with the Secure attribute
    pub secure_cookies: bool,
    /// Origin used by the gate for its session lookup
    pub internal_origin: String,
    pub protected_paths: Vec<String>,
    pub login_path: String,
    pub callback_url: String,
    /// Expose `POST /api/auth/callback/mock` (development only)
    pub allow_mock_sign_in: bool,
    pub token: TokenConfig,
}

impl EdgeConfig {
    /// Configuration with defaults and the given session secret
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            session_secret: session_secret.into(),
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            secure_cookies: false,
            internal_origin: format!("http://127.0.0.1:{}", DEFAULT_PORT),
            protected_paths: DEFAULT_PROTECTED_PATHS.iter().map(|p| p.to_string()).collect(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            allow_mock_sign_in: false,
            token: TokenConfig::default(),
        }
    }

    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JOBBOARD_SESSION_SECRET")
            .ok_or_else(|| ConfigError::Missing("JOBBOARD_SESSION_SECRET".into()))?;
        let mut config = Self::new(secret);

        if let Some(port) = lookup("JOBBOARD_PORT") {
            config.port = parse_var("JOBBOARD_PORT", &port)?;
        }
        config.internal_origin = match lookup("JOBBOARD_INTERNAL_ORIGIN") {
            Some(origin) => origin.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", config.port),
        };
        if let Some(max_age) = lookup("JOBBOARD_SESSION_MAX_AGE_SECS") {
            config.session_max_age_secs = parse_var("JOBBOARD_SESSION_MAX_AGE_SECS", &max_age)?;
        }
        if let Some(secure) = lookup("JOBBOARD_SECURE_COOKIES") {
            config.secure_cookies = parse_bool("JOBBOARD_SECURE_COOKIES", &secure)?;
        }
        if let Some(mock) = lookup("JOBBOARD_ALLOW_MOCK_SIGNIN") {
            config.allow_mock_sign_in = parse_bool("JOBBOARD_ALLOW_MOCK_SIGNIN", &mock)?;
        }
        if let Some(paths) = lookup("JOBBOARD_PROTECTED_PATHS") {
            config.protected_paths = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        let ttl = match lookup("API_TOKEN_TTL_SECS") {
            Some(v) => parse_var("API_TOKEN_TTL_SECS", &v)?,
            None => DEFAULT_TTL_SECS,
        };
        let skew = match lookup("API_TOKEN_SKEW_SECS") {
            Some(v) => parse_var("API_TOKEN_SKEW_SECS", &v)?,
            None => DEFAULT_SKEW_SECS,
        };
        config.token = TokenConfig::default().with_ttl_secs(ttl).with_skew_secs(skew);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JOBBOARD_SESSION_SECRET".into(),
                reason: format!("must be at least {} bytes", MIN_SESSION_SECRET_LEN),
            });
        }
        if self.session_max_age_secs <= 0 {
            return Err(ConfigError::Invalid {
                var: "JOBBOARD_SESSION_MAX_AGE_SECS".into(),
                reason: "must be positive".into(),
            });
        }
        if self.session_max_age_secs > MAX_SESSION_MAX_AGE_SECS {
            return Err(ConfigError::Invalid {
                var: "JOBBOARD_SESSION_MAX_AGE_SECS".into(),
                reason: format!("must not exceed {}", MAX_SESSION_MAX_AGE_SECS),
            });
        }
        if let Some(path) = self.protected_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                var: "JOBBOARD_PROTECTED_PATHS".into(),
                reason: format!("'{}' is not an absolute path", path),
            });
        }
        self.token.validate()?;
        Ok(())
    }

    /// Absolute URL of the identity-session endpoint
    pub fn session_endpoint(&self) -> String {
        format!("{}/api/auth/session", self.internal_origin)
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EdgeConfig::from_lookup(lookup(&[("JOBBOARD_SESSION_SECRET", SECRET)])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.protected_paths, vec!["/jobs", "/newJob"]);
        assert_eq!(config.session_endpoint(), "http://127.0.0.1:3000/api/auth/session");
        assert_eq!(config.token.ttl_secs, 600);
        assert_eq!(config.token.skew_secs, 60);
        assert!(!config.secure_cookies);
        assert!(!config.allow_mock_sign_in);
    }

    #[test]
    fn test_overrides() {
        let config = EdgeConfig::from_lookup(lookup(&[
            ("JOBBOARD_SESSION_SECRET", SECRET),
            ("JOBBOARD_PORT", "8088"),
            ("JOBBOARD_SECURE_COOKIES", "true"),
            ("JOBBOARD_PROTECTED_PATHS", "/jobs, /admin"),
            ("API_TOKEN_TTL_SECS", "300"),
            ("API_TOKEN_SKEW_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.internal_origin, "http://127.0.0.1:8088");
        assert!(config.secure_cookies);
        assert_eq!(config.protected_paths, vec!["/jobs", "/admin"]);
        assert_eq!(config.token.ttl_secs, 300);
        assert_eq!(config.token.skew_secs, 30);
    }

    #[test]
    fn test_missing_secret() {
        let err = EdgeConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        let short = EdgeConfig::from_lookup(lookup(&[("JOBBOARD_SESSION_SECRET", "short")]));
        assert!(matches!(short, Err(ConfigError::Invalid { .. })));

        let port = EdgeConfig::from_lookup(lookup(&[
            ("JOBBOARD_SESSION_SECRET", SECRET),
            ("JOBBOARD_PORT", "eighty"),
        ]));
        assert!(matches!(port, Err(ConfigError::Invalid { var, .. }) if var == "JOBBOARD_PORT"));

        let skew = EdgeConfig::from_lookup(lookup(&[
            ("JOBBOARD_SESSION_SECRET", SECRET),
            ("API_TOKEN_SKEW_SECS", "900"),
        ]));
        assert!(matches!(skew, Err(ConfigError::Token(_))));
    }

    #[test]
    fn test_rejects_out_of_range_lifetimes() {
        let max_age = EdgeConfig::from_lookup(lookup(&[
            ("JOBBOARD_SESSION_SECRET", SECRET),
            ("JOBBOARD_SESSION_MAX_AGE_SECS", "100000000000000"),
        ]));
        assert!(matches!(
            max_age,
            Err(ConfigError::Invalid { var, .. }) if var == "JOBBOARD_SESSION_MAX_AGE_SECS"
        ));

        let ttl = EdgeConfig::from_lookup(lookup(&[
            ("JOBBOARD_SESSION_SECRET", SECRET),
            ("API_TOKEN_TTL_SECS", "9223372036854775807"),
        ]));
        assert!(matches!(ttl, Err(ConfigError::Token(_))));

        let ten_years = EdgeConfig::from_lookup(lookup(&[
            ("JOBBOARD_SESSION_SECRET", SECRET),
            ("JOBBOARD_SESSION_MAX_AGE_SECS", "315360000"),
        ]));
        assert!(ten_years.is_ok());
    }
}
