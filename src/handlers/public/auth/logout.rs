use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::middleware::auth::clear_session_cookie;

/// GET /api/auth/logout - Drop the session cookie and go home
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, clear_session_cookie()),
        ],
    )
}
