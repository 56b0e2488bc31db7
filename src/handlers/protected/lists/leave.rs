// handlers/protected/lists/leave.rs - PATCH /api/lists/leave?id=

use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use serde_json::{json, Value};

use super::collection::{find_list, ListQuery};
use crate::auth::rules::{self, AccessFacts, Action};
use crate::error::ApiError;
use crate::handlers::utils::required_param;
use crate::middleware::{session_user, ApiResponse, ApiResult};
use crate::state::AppState;

const BASE: &str = "lists.leave";

/// Remove the caller from a list's members. The owner cannot leave.
pub async fn list_leave(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let raw = required_param(query.id.as_deref(), BASE, "id", "id (listId) is required")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let list = find_list(&state, raw, BASE).await?;
    rules::check(Action::ListLeave, AccessFacts::for_list(&user, &list))?;

    // A concurrent leave may have removed the membership already
    if !state.store.remove_member(list.id, &user.id).await? {
        return Err(ApiError::forbidden(
            "lists.leave.forbidden",
            "You are not a member of this list.",
        ));
    }

    tracing::info!("User {} left list {}", user.id, list.id);
    Ok(ApiResponse::success(json!({ "listId": list.id, "left": true })))
}
