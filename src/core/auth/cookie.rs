//! Session cookie formatting

use axum::http::{
    HeaderMap, HeaderValue,
    header::{InvalidHeaderValue, SET_COOKIE},
};
use chrono::Utc;

use crate::core::auth::jwt::SessionToken;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "dashboard.session-token";

/// Build an `HttpOnly` cookie carrying the token, valid for its remaining lifetime.
pub fn session_cookie(token: &SessionToken, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = token.remaining_secs(Utc::now());
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}",
        token.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Whether a response already sets or clears the session cookie
pub fn sets_session_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{SESSION_COOKIE}=");
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::jwt::{SessionConfig, SessionTokenManager};
    use crate::core::db::User;

    fn token() -> SessionToken {
        SessionTokenManager::new(SessionConfig::new("cookie_test_secret"))
            .issue(&User::new("a@b.com", "A", "user", "hash"))
            .unwrap()
    }

    #[test]
    fn test_session_cookie_attributes() {
        let token = token();
        let cookie = session_cookie(&token, false).unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with(&format!("dashboard.session-token={}", token.as_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age="));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_cookie() {
        let cookie = session_cookie(&token(), true).unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));

        let cleared = clear_session_cookie(true).unwrap();
        assert!(cleared.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie() {
        let cookie = clear_session_cookie(false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "dashboard.session-token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn test_sets_session_cookie() {
        let mut headers = HeaderMap::new();
        assert!(!sets_session_cookie(&headers));

        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; Path=/"));
        assert!(!sets_session_cookie(&headers));

        headers.append(SET_COOKIE, clear_session_cookie(false).unwrap());
        assert!(sets_session_cookie(&headers));
    }
}
