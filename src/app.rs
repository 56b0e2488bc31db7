use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(auth_routes())
        .merge(list_routes())
        .merge(item_routes())
        .merge(invite_routes())
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/login/google", get(auth::google_login))
        .route("/api/login/github", get(auth::github_login))
        .route("/api/auth/google/callback", get(auth::google_callback))
        .route("/api/auth/github/callback", get(auth::github_callback))
        .route("/api/auth/mock-admin", get(auth::mock_admin))
        .route("/api/auth/mock/:user", get(auth::mock_user))
        .route("/api/auth/logout", get(auth::logout))
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(protected::auth::me_get))
}

fn list_routes() -> Router<AppState> {
    use protected::lists;

    Router::new()
        .route(
            "/api/lists",
            get(lists::list_get)
                .post(lists::list_post)
                .put(lists::list_put)
                .delete(lists::list_delete),
        )
        .route("/api/lists/leave", patch(lists::list_leave))
}

fn item_routes() -> Router<AppState> {
    use protected::items;

    Router::new().route(
        "/api/items",
        get(items::item_get)
            .post(items::item_post)
            .put(items::item_put)
            .patch(items::item_patch)
            .delete(items::item_delete),
    )
}

fn invite_routes() -> Router<AppState> {
    use protected::invites;

    Router::new().route(
        "/api/invites",
        get(invites::invite_get)
            .post(invites::invite_post)
            .patch(invites::invite_patch),
    )
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    // Cookies require explicit origins; a wildcard is not allowed with credentials
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| {
            if origin == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; list explicit origins instead");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Shopping List API",
        "version": version,
        "description": "Shared shopping lists with invites and per-list membership",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/api/login/google, /api/login/github (public)",
            "auth": "/api/auth/me, /api/auth/logout (session)",
            "lists": "/api/lists[?id=], /api/lists/leave?id= (session)",
            "items": "/api/items[?listId=|?id=] (session)",
            "invites": "/api/invites[?id=] (session)",
        },
        "errorMap": {}
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": backend,
                "errorMap": {}
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": backend,
                    "errorMap": {
                        "health.store": { "type": "error", "message": "store unavailable" }
                    }
                })),
            )
        }
    }
}
