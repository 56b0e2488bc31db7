pub mod mock_users;
pub mod oauth;
pub mod rules;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global roles carried in session tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    User,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Administrator => "Administrator",
        }
    }

    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "User" => Some(Role::User),
            "Administrator" => Some(Role::Administrator),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload as it appears on the wire.
///
/// Older tokens carry `id` instead of `sub` and a single `profile` instead of
/// `roles`; both shapes are accepted and normalized into `AuthUser`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, roles: &[Role], expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: Some(subject.into()),
            roles: Some(roles.iter().map(|r| r.as_str().to_string()).collect()),
            exp,
            iat: now.timestamp(),
            ..Default::default()
        }
    }

    pub fn with_profile(mut self, name: Option<String>, email: Option<String>, picture: Option<String>) -> Self {
        self.name = name;
        self.email = email;
        self.picture = picture;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Subject id, falling back to the legacy `id` claim
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .or(self.id.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Known roles, falling back to the legacy single `profile` claim.
    /// Unknown role names are dropped.
    pub fn normalized_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = match (&self.roles, &self.profile) {
            (Some(roles), _) => roles.iter().filter_map(|r| Role::parse(r)).collect(),
            (None, Some(profile)) => Role::parse(profile).into_iter().collect(),
            (None, None) => Vec::new(),
        };
        roles.sort();
        roles.dedup();
        roles
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Missing authentication token")]
    Missing,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token carries no subject")]
    MissingSubject,

    #[error("JWT generation error: {0}")]
    Generation(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature and expiry and return the raw claims
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_claims() {
        let claims = Claims::new("user-1", &[Role::User], 1).with_provider("google");
        let token = generate_jwt(&claims, SECRET).unwrap();

        let decoded = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded.subject(), Some("user-1"));
        assert_eq!(decoded.normalized_roles(), vec![Role::User]);
        assert_eq!(decoded.provider.as_deref(), Some("google"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_jwt(&Claims::new("user-1", &[Role::User], 1), SECRET).unwrap();
        assert!(matches!(decode_jwt(&token, "other-secret"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new("user-1", &[Role::User], 1);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(matches!(decode_jwt(&token, SECRET), Err(TokenError::Expired)));
    }

    #[test]
    fn empty_secret_fails_closed() {
        assert!(matches!(generate_jwt(&Claims::default(), ""), Err(TokenError::MissingSecret)));
        assert!(matches!(decode_jwt("a.b.c", ""), Err(TokenError::MissingSecret)));
    }

    #[test]
    fn normalizes_legacy_id_and_profile() {
        let claims = Claims {
            id: Some("admin1".into()),
            profile: Some("Administrator".into()),
            ..Default::default()
        };
        assert_eq!(claims.subject(), Some("admin1"));
        assert_eq!(claims.normalized_roles(), vec![Role::Administrator]);
    }

    #[test]
    fn drops_unknown_roles() {
        let claims = Claims {
            sub: Some("u".into()),
            roles: Some(vec!["User".into(), "Wizard".into(), "User".into()]),
            ..Default::default()
        };
        assert_eq!(claims.normalized_roles(), vec![Role::User]);
    }
}
