// handlers/protected/auth/me.rs - GET /api/auth/me

use axum::{extract::State, http::HeaderMap};
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::models::UserProfile;
use crate::middleware::{session_user, ApiResponse, ApiResult};
use crate::state::AppState;

/// Current user, created or refreshed from the session claims.
///
/// Anonymous callers get `{ user: null }` with a 200 and the auth error in the
/// errorMap, so the frontend can check the session without special casing.
pub async fn me_get(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let session = match session_user(&headers, &state.config.security, "auth") {
        Ok(user) => user,
        Err(err) => {
            return Ok(ApiResponse::success(json!({ "user": null })).with_error_map(err.error_map().clone()));
        }
    };

    let profile = UserProfile {
        id: session.id,
        name: session.name,
        email: session.email,
        picture: session.picture,
    };
    let user = state.store.upsert_user(profile, Utc::now()).await?;

    Ok(ApiResponse::success(json!({ "user": user })))
}
