// handlers/public/auth/oauth.rs - Provider redirects and callbacks

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::oauth::{self, OAuthError, OAuthProvider};
use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::auth::{
    clear_oauth_state_cookie, cookie_value, oauth_state_cookie, session_cookie, OAUTH_STATE_COOKIE,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/login/google
pub async fn google_login(State(state): State<AppState>) -> Response {
    login(&state, OAuthProvider::Google)
}

/// GET /api/login/github
pub async fn github_login(State(state): State<AppState>) -> Response {
    login(&state, OAuthProvider::GitHub)
}

/// GET /api/auth/google/callback
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    callback(&state, OAuthProvider::Google, &headers, query).await
}

/// GET /api/auth/github/callback
pub async fn github_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    callback(&state, OAuthProvider::GitHub, &headers, query).await
}

fn login(state: &AppState, provider: OAuthProvider) -> Response {
    let login_state = oauth::new_state();
    let url = provider
        .client(&state.config.oauth)
        .and_then(|client| provider.authorize_url(client, &state.config.server.public_url, &login_state));

    match url {
        Ok(url) => {
            tracing::info!("Redirecting to {} consent page", provider.as_str());
            (
                StatusCode::FOUND,
                [
                    (header::LOCATION, url.to_string()),
                    (header::SET_COOKIE, oauth_state_cookie(&login_state, &state.config.security)),
                ],
            )
                .into_response()
        }
        Err(e) => oauth_error(provider, e).into_response(),
    }
}

async fn callback(state: &AppState, provider: OAuthProvider, headers: &HeaderMap, query: CallbackQuery) -> Response {
    let issued = cookie_value(headers, OAUTH_STATE_COOKIE);
    match complete_login(state, provider, issued.as_deref(), query).await {
        Ok(cookie) => (
            StatusCode::FOUND,
            AppendHeaders([
                (header::LOCATION, "/".to_string()),
                (header::SET_COOKIE, cookie),
                (header::SET_COOKIE, clear_oauth_state_cookie()),
            ]),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Exchange the code, record the user, and mint the session cookie
async fn complete_login(
    state: &AppState,
    provider: OAuthProvider,
    issued_state: Option<&str>,
    query: CallbackQuery,
) -> Result<String, ApiError> {
    if let Some(error) = query.error {
        tracing::warn!("{} login denied: {}", provider.as_str(), error);
        return Err(failure(provider));
    }

    let client = provider
        .client(&state.config.oauth)
        .map_err(|e| oauth_error(provider, e))?;
    oauth::verify_state(issued_state, query.state.as_deref()).map_err(|e| oauth_error(provider, e))?;

    let code = query.code.unwrap_or_default();
    let profile = provider
        .fetch_profile(&state.http, client, &state.config.server.public_url, &code)
        .await
        .map_err(|e| oauth_error(provider, e))?;

    let user = state.store.upsert_user(profile, Utc::now()).await?;

    let claims = Claims::new(&user.id, &user.roles, state.config.security.jwt_expiry_hours)
        .with_profile(user.name.clone(), user.email.clone(), user.picture.clone())
        .with_provider(provider.as_str());
    let token = generate_jwt(&claims, &state.config.security.jwt_secret).map_err(|e| {
        tracing::error!("Failed to sign session for {}: {}", user.id, e);
        ApiError::internal("auth.token", "Could not create session")
    })?;

    tracing::info!("User {} logged in via {}", user.id, provider.as_str());
    Ok(session_cookie(&token, &state.config.security))
}

fn oauth_error(provider: OAuthProvider, err: OAuthError) -> ApiError {
    match err {
        OAuthError::NotConfigured(name) => ApiError::not_found(
            format!("auth.{}.notConfigured", provider.as_str()),
            format!("{} login is not configured", name),
        ),
        other => {
            tracing::warn!("{} login failed: {}", provider.as_str(), other);
            failure(provider)
        }
    }
}

fn failure(provider: OAuthProvider) -> ApiError {
    let name = match provider {
        OAuthProvider::Google => "Google",
        OAuthProvider::GitHub => "GitHub",
    };
    ApiError::validation(
        format!("auth.{}.callback", provider.as_str()),
        format!("{} authentication failed", name),
    )
}
