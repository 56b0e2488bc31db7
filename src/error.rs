// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::ErrorMap;
use crate::database::RepositoryError;

/// HTTP API error; every variant carries the errorMap returned to the client
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(ErrorMap),
    IllegalState(ErrorMap),

    // 401 Unauthorized
    Unauthenticated(ErrorMap),

    // 403 Forbidden
    Forbidden(ErrorMap),

    // 404 Not Found
    NotFound(ErrorMap),

    // 500 Internal Server Error
    Internal(ErrorMap),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::IllegalState(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_map(&self) -> &ErrorMap {
        match self {
            ApiError::Validation(map)
            | ApiError::IllegalState(map)
            | ApiError::Unauthenticated(map)
            | ApiError::Forbidden(map)
            | ApiError::NotFound(map)
            | ApiError::Internal(map) => map,
        }
    }

    /// Error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::IllegalState(_) => "ILLEGAL_STATE",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ApiError {
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(ErrorMap::single(key, message))
    }

    pub fn illegal_state(key: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::IllegalState(ErrorMap::single(key, message))
    }

    pub fn unauthenticated(key: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(ErrorMap::single(key, message))
    }

    pub fn forbidden(key: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Forbidden(ErrorMap::single(key, message))
    }

    pub fn not_found(key: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::NotFound(ErrorMap::single(key, message))
    }

    pub fn internal(key: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Internal(ErrorMap::single(key, message))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        // Don't expose storage errors to clients
        tracing::error!("Repository error: {}", err);
        ApiError::internal("store.internal", "An error occurred while processing your request")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.error_map().keys().collect();
        write!(f, "{} [{}]", self.error_code(), keys.join(", "))
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = json!({ "errorMap": self.error_map() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ApiError::validation("a.b", "x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::illegal_state("a.b", "x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthenticated("a.auth", "x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("a.forbidden", "x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("a.notFound", "x").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repository_errors_become_internal() {
        let err: ApiError = RepositoryError::Query("boom".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.error_map().contains_key("store.internal"));
    }
}
