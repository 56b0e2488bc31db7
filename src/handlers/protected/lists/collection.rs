// handlers/protected/lists/collection.rs - /api/lists

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::rules::{self, AccessFacts, Action};
use crate::auth::Role;
use crate::database::models::shopping_list::MAX_LIST_NAME_LEN;
use crate::database::models::ShoppingList;
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, required_param, typed, validated_body};
use crate::middleware::{session_user, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::FieldRule;

const BASE: &str = "lists";

const NAME_SCHEMA: &[(&str, FieldRule)] = &[("name", FieldRule::string().non_empty().max_len(MAX_LIST_NAME_LEN))];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListName {
    name: String,
}

/// GET /api/lists[?id=] - Lists visible to the caller, or a single list
pub async fn list_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let user = session_user(&headers, &state.config.security, BASE)?;
    rules::authorize(&user, &[Role::User], BASE)?;

    if let Some(raw) = query.id.as_deref() {
        let raw = required_param(Some(raw), "lists.read", "id", "id cannot be empty")?;
        let list = find_list(&state, raw, "lists.read").await?;
        rules::check(Action::ListRead, AccessFacts::for_list(&user, &list))?;
        return Ok(ApiResponse::success(json!({ "list": list })));
    }

    let lists = if user.is_admin() {
        state.store.all_lists().await?
    } else {
        state.store.lists_visible_to(&user.id).await?
    };

    Ok(ApiResponse::success(json!({ "lists": lists })))
}

/// POST /api/lists - Create a list owned by the caller
pub async fn list_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = validated_body(payload, NAME_SCHEMA, "lists.create")?;
    let user = session_user(&headers, &state.config.security, BASE)?;
    rules::authorize(&user, &[Role::User], BASE)?;

    let ListName { name } = typed(body, "lists.create")?;
    let list = ShoppingList::new(name.trim(), &user.id, Utc::now());
    state.store.insert_list(&list).await?;

    tracing::info!("User {} created list {}", user.id, list.id);
    Ok(ApiResponse::success(json!({ "list": list })))
}

/// PUT /api/lists?id= - Rename a list (owner or Administrator)
pub async fn list_put(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let raw = required_param(query.id.as_deref(), "lists.update", "id", "id is required")?;
    let body = validated_body(payload, NAME_SCHEMA, "lists.update")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let list = find_list(&state, raw, "lists.update").await?;
    rules::check(Action::ListUpdate, AccessFacts::for_list(&user, &list))?;

    let ListName { name } = typed(body, "lists.update")?;
    let renamed = state
        .store
        .rename_list(list.id, name.trim(), &user.id, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found("lists.update.notFound", "List not found"))?;

    Ok(ApiResponse::success(json!({ "list": renamed })))
}

/// DELETE /api/lists?id= - Delete a list (owner or Administrator); items and invites stay
pub async fn list_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let raw = required_param(query.id.as_deref(), "lists.delete", "id", "id is required")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let list = find_list(&state, raw, "lists.delete").await?;
    rules::check(Action::ListDelete, AccessFacts::for_list(&user, &list))?;

    let deleted = state.store.delete_list(list.id).await?;
    if !deleted {
        return Err(ApiError::not_found("lists.delete.notFound", "List not found"));
    }

    tracing::info!("User {} deleted list {}", user.id, list.id);
    Ok(ApiResponse::success(json!({ "_id": list.id, "deleted": true })))
}

/// Load a list by its raw id, reporting `<base>.notFound` for unknown or malformed ids
pub(super) async fn find_list(state: &AppState, raw: &str, base: &str) -> Result<ShoppingList, ApiError> {
    let key = format!("{}.notFound", base);
    let id = parse_id(raw, &key, "List not found")?;
    state
        .store
        .find_list(id)
        .await?
        .ok_or_else(|| ApiError::not_found(key, "List not found"))
}
