//! Session cookie names and header helpers

use axum::http::{header, HeaderMap};

/// Cookie name used over HTTPS
pub const SECURE_SESSION_COOKIE: &str = "__Secure-next-auth.session-token";

/// Cookie name used over plain HTTP
pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// Find a cookie's value in a `Cookie` header
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Raw `Cookie` header, with multiple headers joined
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    (!joined.is_empty()).then_some(joined)
}

/// Session token from a request, secure cookie name first
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = cookie_header(headers)?;
    cookie_value(&cookies, SECURE_SESSION_COOKIE)
        .or_else(|| cookie_value(&cookies, SESSION_COOKIE))
        .map(String::from)
}

/// Attributes for issuing the session cookie
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl CookieSettings {
    pub fn name(&self) -> &'static str {
        if self.secure {
            SECURE_SESSION_COOKIE
        } else {
            SESSION_COOKIE
        }
    }

    /// `Set-Cookie` value carrying a session token
    pub fn issue(&self, value: &str) -> String {
        self.build(value, self.max_age_secs)
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear(&self) -> String {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name(),
            value,
            max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let header = "theme=dark; next-auth.session-token=abc.def; other=1";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(header, SECURE_SESSION_COOKIE), None);
        assert_eq!(cookie_value("next-auth.session-token=", SESSION_COOKIE), None);
    }

    #[test]
    fn test_secure_cookie_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static(
                "next-auth.session-token=plain; __Secure-next-auth.session-token=secure",
            ),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("secure"));
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("next-auth.session-token=t"));
        assert_eq!(session_token(&headers).as_deref(), Some("t"));
    }

    #[test]
    fn test_set_cookie_attributes() {
        let secure = CookieSettings { secure: true, max_age_secs: 60 };
        assert_eq!(
            secure.issue("tok"),
            "__Secure-next-auth.session-token=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
        );

        let plain = CookieSettings { secure: false, max_age_secs: 60 };
        assert!(plain.clear().starts_with("next-auth.session-token=; "));
        assert!(plain.clear().contains("Max-Age=0"));
    }
}
