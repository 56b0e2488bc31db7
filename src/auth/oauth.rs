//! Authorization-code login against Google and GitHub.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::{OAuthClient, OAuthConfig};
use crate::database::models::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    GitHub,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{0} login is not configured")]
    NotConfigured(&'static str),

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Login state missing or mismatched")]
    StateMismatch,

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Profile lookup failed: {0}")]
    Profile(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubProfile {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::GitHub => "github",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::GitHub => "GitHub",
        }
    }

    fn authorize_endpoint(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            OAuthProvider::GitHub => "https://github.com/login/oauth/authorize",
        }
    }

    fn token_endpoint(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "https://oauth2.googleapis.com/token",
            OAuthProvider::GitHub => "https://github.com/login/oauth/access_token",
        }
    }

    fn scope(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "openid email profile",
            OAuthProvider::GitHub => "read:user user:email",
        }
    }

    /// Client credentials, or `NotConfigured` if the provider is disabled
    pub fn client<'a>(&self, config: &'a OAuthConfig) -> Result<&'a OAuthClient, OAuthError> {
        let client = match self {
            OAuthProvider::Google => config.google.as_ref(),
            OAuthProvider::GitHub => config.github.as_ref(),
        };
        client.ok_or(OAuthError::NotConfigured(self.display_name()))
    }

    pub fn redirect_uri(&self, public_url: &str) -> String {
        format!("{}/api/auth/{}/callback", public_url.trim_end_matches('/'), self.as_str())
    }

    /// Provider consent page the browser is sent to
    pub fn authorize_url(&self, client: &OAuthClient, public_url: &str, state: &str) -> Result<Url, OAuthError> {
        let mut url = Url::parse(self.authorize_endpoint())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &client.client_id)
                .append_pair("redirect_uri", &self.redirect_uri(public_url))
                .append_pair("scope", self.scope())
                .append_pair("state", state);
            if *self == OAuthProvider::Google {
                query.append_pair("response_type", "code");
            }
        }
        Ok(url)
    }

    /// Trade the callback `code` for the caller's profile
    pub async fn fetch_profile(
        &self,
        http: &reqwest::Client,
        client: &OAuthClient,
        public_url: &str,
        code: &str,
    ) -> Result<UserProfile, OAuthError> {
        if code.trim().is_empty() {
            return Err(OAuthError::MissingCode);
        }

        let access_token = self.exchange_code(http, client, public_url, code).await?;
        match self {
            OAuthProvider::Google => google_profile(http, &access_token).await,
            OAuthProvider::GitHub => github_profile(http, &access_token).await,
        }
    }

    async fn exchange_code(
        &self,
        http: &reqwest::Client,
        client: &OAuthClient,
        public_url: &str,
        code: &str,
    ) -> Result<String, OAuthError> {
        let redirect_uri = self.redirect_uri(public_url);
        let params = [
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = http
            .post(self.token_endpoint())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Exchange(text));
        }

        // GitHub reports failures with a 200 and an `error` field
        let token: TokenResponse = response.json().await?;
        match (token.access_token, token.error) {
            (Some(access_token), None) => Ok(access_token),
            (_, Some(error)) => Err(OAuthError::Exchange(token.error_description.unwrap_or(error))),
            (None, None) => Err(OAuthError::Exchange("no access token in response".to_string())),
        }
    }
}

/// Fresh value for the `state` round trip
pub fn new_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// The callback must echo the state issued to this browser at login
pub fn verify_state(issued: Option<&str>, returned: Option<&str>) -> Result<(), OAuthError> {
    match (issued, returned) {
        (Some(issued), Some(returned)) if !issued.is_empty() && issued == returned => Ok(()),
        _ => Err(OAuthError::StateMismatch),
    }
}

async fn google_profile(http: &reqwest::Client, access_token: &str) -> Result<UserProfile, OAuthError> {
    let response = http
        .get("https://www.googleapis.com/oauth2/v3/userinfo")
        .bearer_auth(access_token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(OAuthError::Profile(format!("Google userinfo returned {}", response.status())));
    }

    let profile: GoogleProfile = response.json().await?;
    Ok(UserProfile {
        id: profile.sub,
        name: profile.name,
        email: profile.email,
        picture: profile.picture,
    })
}

async fn github_profile(http: &reqwest::Client, access_token: &str) -> Result<UserProfile, OAuthError> {
    let response = http
        .get("https://api.github.com/user")
        .bearer_auth(access_token)
        .header(reqwest::header::USER_AGENT, concat!("shopping-list-api/", env!("CARGO_PKG_VERSION")))
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(OAuthError::Profile(format!("GitHub user API returned {}", response.status())));
    }

    let profile: GitHubProfile = response.json().await?;
    Ok(UserProfile {
        id: profile.id.to_string(),
        name: profile.name.or(Some(profile.login)),
        email: profile.email,
        picture: profile.avatar_url,
    })
}
