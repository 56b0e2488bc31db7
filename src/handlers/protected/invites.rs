// handlers/protected/invites.rs - /api/invites

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::rules::{self, AccessFacts, Action};
use crate::database::models::{Invite, InviteRole};
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, required_param, typed, validated_body};
use crate::middleware::{session_user, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::FieldRule;

const BASE: &str = "invites";

const CREATE_SCHEMA: &[(&str, FieldRule)] = &[
    ("shoppingListId", FieldRule::string().non_empty()),
    ("userId", FieldRule::string().non_empty()),
    ("role", FieldRule::string().optional()),
];

#[derive(Debug, Deserialize)]
pub struct InviteQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewInvite {
    shopping_list_id: String,
    user_id: String,
    role: Option<String>,
}

/// GET /api/invites - Administrators see every invite, everyone else their own
pub async fn invite_get(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Value> {
    let user = session_user(&headers, &state.config.security, BASE)?;

    let invites = if user.is_admin() {
        state.store.all_invites().await?
    } else {
        state.store.invites_for_user(&user.id).await?
    };

    Ok(ApiResponse::success(json!({ "invites": invites })))
}

/// POST /api/invites - Invite a user to a list (owner or Administrator)
pub async fn invite_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = validated_body(payload, CREATE_SCHEMA, "invites.create")?;
    let fields: NewInvite = typed(body, "invites.create")?;
    let role = parse_role(fields.role.as_deref())?;

    let user = session_user(&headers, &state.config.security, BASE)?;

    let list_id = parse_id(fields.shopping_list_id.trim(), "invites.create.listNotFound", "List not found")?;
    let list = state
        .store
        .find_list(list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("invites.create.listNotFound", "List not found"))?;
    rules::check(Action::InviteCreate, AccessFacts::for_list(&user, &list))?;

    let invitee = fields.user_id.trim();
    if list.is_visible_to(invitee) {
        return Err(ApiError::validation(
            "invites.create.userId",
            "User is already a member of this list",
        ));
    }

    let invite = Invite::new(list.id, invitee, role, Utc::now());
    state.store.insert_invite(&invite).await?;

    tracing::info!("User {} invited {} to list {}", user.id, invitee, list.id);
    Ok(ApiResponse::success(json!({ "invite": invite })))
}

/// PATCH /api/invites?id= - Accept an invite addressed to the caller
pub async fn invite_patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<InviteQuery>,
) -> ApiResult<Value> {
    let raw = required_param(query.id.as_deref(), "invites.accept", "id", "invite id is required")?;
    let user = session_user(&headers, &state.config.security, BASE)?;

    let id = parse_id(raw, "invites.accept.notFound", "Invite not found")?;
    let invite = state
        .store
        .find_invite(id)
        .await?
        .ok_or_else(|| ApiError::not_found("invites.accept.notFound", "Invite not found"))?;
    rules::check(Action::InviteAccept, AccessFacts::for_invite(&user, &invite))?;

    let accepted = state
        .store
        .accept_invite(invite.id, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found("invites.accept.notFound", "Invite not found"))?;

    tracing::info!("User {} accepted invite {}", user.id, accepted.id);
    Ok(ApiResponse::success(json!({
        "message": "Invite accepted",
        "invite": accepted
    })))
}

fn parse_role(raw: Option<&str>) -> Result<InviteRole, ApiError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(InviteRole::default()),
        Some(raw) => raw.parse().map_err(|_| {
            let allowed: Vec<&str> = InviteRole::ALL.iter().map(InviteRole::as_str).collect();
            ApiError::validation(
                "invites.create.role",
                format!("role must be one of {}", allowed.join(", ")),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_member() {
        assert_eq!(parse_role(None).unwrap(), InviteRole::Member);
        assert_eq!(parse_role(Some("")).unwrap(), InviteRole::Member);
        assert_eq!(parse_role(Some("viewer")).unwrap(), InviteRole::Viewer);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = parse_role(Some("owner")).unwrap_err();
        let entry = err.error_map().get("invites.create.role").unwrap();
        assert_eq!(entry.message, "role must be one of member, viewer, editor, admin");
    }
}
