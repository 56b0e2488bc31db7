// handlers/protected/items.rs - /api/items

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::rules::{self, AccessFacts, Action};
use crate::database::models::{Item, ItemChanges, NewItem, ShoppingList};
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, required_param, typed, validated_body};
use crate::middleware::{session_user, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::FieldRule;

const BASE: &str = "items";

const CREATE_SCHEMA: &[(&str, FieldRule)] = &[
    ("listId", FieldRule::string().non_empty()),
    ("name", FieldRule::string().non_empty()),
    ("quantity", FieldRule::number().optional()),
    ("unit", FieldRule::string().optional()),
    ("note", FieldRule::string().optional()),
];

const UPDATE_SCHEMA: &[(&str, FieldRule)] = &[
    ("id", FieldRule::string().non_empty()),
    ("name", FieldRule::string().optional().non_empty()),
    ("quantity", FieldRule::number().optional()),
    ("unit", FieldRule::string().optional()),
    ("note", FieldRule::string().optional()),
];

const TOGGLE_SCHEMA: &[(&str, FieldRule)] = &[
    ("id", FieldRule::string().non_empty()),
    ("completed", FieldRule::boolean()),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    pub id: Option<String>,
    pub list_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemUpdate {
    id: String,
    #[serde(flatten)]
    changes: ItemChanges,
}

#[derive(Debug, Deserialize)]
struct ItemToggle {
    id: String,
    completed: bool,
}

/// GET /api/items?listId= - Items of a list the caller can see
pub async fn item_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Value> {
    let raw = required_param(query.list_id.as_deref(), "items.read", "listId", "listId is required")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let list_id = parse_id(raw, "items.read.listNotFound", "List not found")?;
    let list = state
        .store
        .find_list(list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("items.read.listNotFound", "List not found"))?;
    rules::check(Action::ItemRead, AccessFacts::for_list(&user, &list))?;

    let items = state.store.items_for_list(list.id).await?;
    Ok(ApiResponse::success(json!({ "items": items })))
}

/// POST /api/items - Add an item; the caller becomes `addedBy`
pub async fn item_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = validated_body(payload, CREATE_SCHEMA, "items.create")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let fields: NewItem = typed(body, "items.create")?;
    let list_id = parse_id(fields.list_id.trim(), "items.create.listNotFound", "List not found")?;
    if state.store.find_list(list_id).await?.is_none() {
        return Err(ApiError::not_found("items.create.listNotFound", "List not found"));
    }
    rules::check(Action::ItemCreate, AccessFacts::default())?;

    let item = Item::new(list_id, fields, &user.id, Utc::now());
    state.store.insert_item(&item).await?;

    tracing::debug!("User {} added item {} to list {}", user.id, item.id, list_id);
    Ok(ApiResponse::success(json!({ "item": item })))
}

/// PUT /api/items - Edit an item (Administrator, list owner, or creator)
pub async fn item_put(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = validated_body(payload, UPDATE_SCHEMA, "items.update")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let ItemUpdate { id, changes } = typed(body, "items.update")?;
    let (item, list) = find_item(&state, &id, "items.update").await?;
    rules::check(Action::ItemUpdate, AccessFacts::for_item(&user, &item, list.as_ref()))?;

    let item = state
        .store
        .update_item_details(item.id, &changes, Utc::now())
        .await?
        .ok_or_else(|| gone("items.update"))?;

    Ok(ApiResponse::success(json!({ "item": item })))
}

/// PATCH /api/items - Mark an item done or not done
pub async fn item_patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = validated_body(payload, TOGGLE_SCHEMA, "items.toggle")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let ItemToggle { id, completed } = typed(body, "items.toggle")?;
    let (item, list) = find_item(&state, &id, "items.toggle").await?;
    rules::check(Action::ItemToggle, AccessFacts::for_item(&user, &item, list.as_ref()))?;

    let item = state
        .store
        .set_item_completed(item.id, completed, &user.id, Utc::now())
        .await?
        .ok_or_else(|| gone("items.toggle"))?;

    Ok(ApiResponse::success(json!({ "item": item })))
}

/// DELETE /api/items?id= - Remove an item (Administrator, list owner, or creator)
pub async fn item_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Value> {
    let raw = required_param(query.id.as_deref(), "items.delete", "id", "id is required")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let (item, list) = find_item(&state, raw, "items.delete").await?;
    rules::check(Action::ItemDelete, AccessFacts::for_item(&user, &item, list.as_ref()))?;

    if !state.store.delete_item(item.id).await? {
        return Err(gone("items.delete"));
    }

    Ok(ApiResponse::success(json!({ "id": item.id, "deleted": true })))
}

/// Load an item and, if it still exists, its parent list
async fn find_item(state: &AppState, raw: &str, base: &str) -> Result<(Item, Option<ShoppingList>), ApiError> {
    let key = format!("{}.notFound", base);
    let id = parse_id(raw.trim(), &key, "Item not found")?;
    let item = state
        .store
        .find_item(id)
        .await?
        .ok_or_else(|| ApiError::not_found(key, "Item not found"))?;
    let list = state.store.find_list(item.list_id).await?;
    Ok((item, list))
}

/// The item vanished between lookup and write
fn gone(base: &str) -> ApiError {
    ApiError::not_found(format!("{}.notFound", base), "Item not found")
}
