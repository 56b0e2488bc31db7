use axum::http::{header, HeaderMap};

use crate::auth::{decode_jwt, Claims, Role, TokenError};
use crate::config::SecurityConfig;
use crate::error::ApiError;

/// Name of the HttpOnly cookie carrying the session JWT
pub const SESSION_COOKIE: &str = "token";

/// Session cookie lifetime (7 days)
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Cookie binding an OAuth callback to the browser that started the login
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// How long a started OAuth login may take to come back
pub const OAUTH_STATE_MAX_AGE_SECS: i64 = 60 * 10;

/// Canonical identity resolved from a verified session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub roles: Vec<Role>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Administrator)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|r| roles.contains(r))
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims.subject().ok_or(TokenError::MissingSubject)?.to_string();
        let roles = claims.normalized_roles();

        Ok(Self {
            id,
            roles,
            name: claims.name,
            email: claims.email,
            picture: claims.picture,
        })
    }
}

/// Resolve the caller from the `token` cookie.
///
/// Every failure is reported the same way: a `<base>.auth` entry and a 401.
pub fn session_user(headers: &HeaderMap, security: &SecurityConfig, base: &str) -> Result<AuthUser, ApiError> {
    verify_session(headers, &security.jwt_secret).map_err(|e| {
        tracing::debug!("Session verification failed for {}: {}", base, e);
        let message = match e {
            TokenError::Missing => "Missing authentication token",
            _ => "Invalid or expired token",
        };
        ApiError::unauthenticated(format!("{}.auth", base), message)
    })
}

/// Verify the session cookie and normalize its claims
pub fn verify_session(headers: &HeaderMap, secret: &str) -> Result<AuthUser, TokenError> {
    let token = extract_token_from_cookies(headers).ok_or(TokenError::Missing)?;
    let claims = decode_jwt(&token, secret)?;
    AuthUser::try_from(claims)
}

/// Extract the session token from the Cookie header(s)
pub fn extract_token_from_cookies(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE)
}

/// First non-empty value of the named cookie
pub fn cookie_value(headers: &HeaderMap, cookie: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Set-Cookie value establishing a session
pub fn session_cookie(token: &str, security: &SecurityConfig) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    );
    if security.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Set-Cookie value that expires the session immediately
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Short-lived cookie holding the OAuth `state` issued at login
pub fn oauth_state_cookie(state: &str, security: &SecurityConfig) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/api/auth; SameSite=Lax; Max-Age={}",
        OAUTH_STATE_COOKIE, state, OAUTH_STATE_MAX_AGE_SECS
    );
    if security.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_oauth_state_cookie() -> String {
    format!("{}=; HttpOnly; Path=/api/auth; Max-Age=0", OAUTH_STATE_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use crate::config::AppConfig;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(extract_token_from_cookies(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn ignores_similarly_named_cookies() {
        let headers = headers_with_cookie("xtoken=nope; token_old=nope");
        assert_eq!(extract_token_from_cookies(&headers), None);
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let headers = headers_with_cookie("token=");
        assert_eq!(extract_token_from_cookies(&headers), None);
    }

    #[test]
    fn session_user_reports_keyed_auth_error() {
        let config = AppConfig::development();
        let err = session_user(&HeaderMap::new(), &config.security, "lists").unwrap_err();
        assert!(err.error_map().contains_key("lists.auth"));
    }

    #[test]
    fn session_user_normalizes_claims() {
        let config = AppConfig::development();
        let claims = Claims::new("sub-1", &[Role::User, Role::Administrator], 1);
        let token = generate_jwt(&claims, &config.security.jwt_secret).unwrap();
        let headers = headers_with_cookie(&format!("token={}", token));

        let user = session_user(&headers, &config.security, "lists").unwrap();
        assert_eq!(user.id, "sub-1");
        assert!(user.is_admin());
        assert!(user.has_any_role(&[Role::User]));
    }

    #[test]
    fn secure_flag_follows_config() {
        let mut config = AppConfig::development();
        assert!(!session_cookie("t", &config.security).contains("Secure"));
        config.security.cookie_secure = true;
        assert!(session_cookie("t", &config.security).ends_with("; Secure"));
    }
}
