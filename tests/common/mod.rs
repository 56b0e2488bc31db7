#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use shopping_list_api::auth::{generate_jwt, Claims, Role};
use shopping_list_api::config::AppConfig;
use shopping_list_api::database::MemoryStore;
use shopping_list_api::{app, AppState};

/// In-process application over a fresh in-memory store
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// True if the errorMap carries `key`
    pub fn has_error(&self, key: &str) -> bool {
        self.body["errorMap"].get(key).is_some()
    }

    pub fn error_map_is_empty(&self) -> bool {
        self.body["errorMap"].as_object().map(|m| m.is_empty()).unwrap_or(false)
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        let router = app(state.clone());
        Self { state, router }
    }

    /// Cookie header value for a session with the given roles
    pub fn session(&self, subject: &str, roles: &[Role]) -> String {
        let claims = Claims::new(subject, roles, 1);
        self.cookie_for(&claims)
    }

    pub fn cookie_for(&self, claims: &Claims) -> String {
        let token = generate_jwt(claims, &self.state.config.security.jwt_secret).expect("sign test token");
        format!("token={}", token)
    }

    pub fn user(&self, subject: &str) -> String {
        self.session(subject, &[Role::User])
    }

    pub fn admin(&self, subject: &str) -> String {
        self.session(subject, &[Role::Administrator])
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read response body")?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(cookie), Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(cookie), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, cookie: &str, body: Option<Value>) -> Result<TestResponse> {
        self.request(Method::PATCH, uri, Some(cookie), body).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, Some(cookie), None).await
    }

    /// Create a list and return its id
    pub async fn create_list(&self, cookie: &str, name: &str) -> Result<String> {
        let res = self.post("/api/lists", cookie, serde_json::json!({ "name": name })).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "create list failed: {}", res.body);
        id_of(&res.body["list"])
    }

    /// Create an item and return its id
    pub async fn create_item(&self, cookie: &str, list_id: &str, name: &str) -> Result<String> {
        let res = self
            .post("/api/items", cookie, serde_json::json!({ "listId": list_id, "name": name }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "create item failed: {}", res.body);
        id_of(&res.body["item"])
    }

    /// Invite `invitee` to the list and accept as them
    pub async fn add_member(&self, owner: &str, list_id: &str, invitee: &str) -> Result<()> {
        let res = self
            .post(
                "/api/invites",
                owner,
                serde_json::json!({ "shoppingListId": list_id, "userId": invitee }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "invite failed: {}", res.body);
        let invite_id = id_of(&res.body["invite"])?;

        let res = self
            .patch(&format!("/api/invites?id={}", invite_id), &self.user(invitee), None)
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "accept failed: {}", res.body);
        Ok(())
    }
}

pub fn id_of(entity: &Value) -> Result<String> {
    entity["_id"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("entity has no _id: {}", entity))
}
