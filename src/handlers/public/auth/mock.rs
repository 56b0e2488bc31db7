// handlers/public/auth/mock.rs - Development logins without an OAuth provider

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::generate_jwt;
use crate::auth::mock_users::{self, MockUser, MOCK_ADMIN};
use crate::error::ApiError;
use crate::middleware::auth::session_cookie;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /api/auth/mock-admin
pub async fn mock_admin(State(state): State<AppState>) -> Result<Response, ApiError> {
    issue(&state, &MOCK_ADMIN, "Mock admin logged in".to_string())
}

/// GET /api/auth/mock/:user
pub async fn mock_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let user = mock_users::find(&id)
        .ok_or_else(|| ApiError::not_found("auth.mock.notFound", format!("Unknown mock user '{}'", id)))?;
    issue(&state, user, format!("Mock user {} logged in", user.id))
}

fn issue(state: &AppState, user: &MockUser, message: String) -> Result<Response, ApiError> {
    let security = &state.config.security;
    if !security.enable_mock_login {
        return Err(ApiError::not_found("auth.mock.disabled", "Mock login is disabled"));
    }

    let token = generate_jwt(&user.claims(security.jwt_expiry_hours), &security.jwt_secret).map_err(|e| {
        tracing::error!("Failed to sign mock session: {}", e);
        ApiError::internal("auth.token", "Could not create session")
    })?;

    tracing::info!("Issued mock session for {}", user.id);
    let cookie = session_cookie(&token, security);
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "message": message, "token": token })),
    )
        .into_response())
}
