//! Role gate and per-resource ownership policy.
//!
//! Handlers gather the facts about the caller's relation to a resource and
//! ask `decide`; the policy table lives here and nowhere else.

use crate::auth::Role;
use crate::database::models::{Invite, Item, ShoppingList};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Operation being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListRead,
    ListUpdate,
    ListDelete,
    ListLeave,
    ItemCreate,
    ItemRead,
    ItemUpdate,
    ItemDelete,
    ItemToggle,
    InviteCreate,
    InviteAccept,
}

impl Action {
    /// Resource segment of the error key
    pub fn resource(&self) -> &'static str {
        match self {
            Action::ListRead | Action::ListUpdate | Action::ListDelete | Action::ListLeave => "lists",
            Action::ItemCreate | Action::ItemRead | Action::ItemUpdate | Action::ItemDelete | Action::ItemToggle => {
                "items"
            }
            Action::InviteCreate | Action::InviteAccept => "invites",
        }
    }

    /// Action segment of the error key
    pub fn name(&self) -> &'static str {
        match self {
            Action::ListRead | Action::ItemRead => "read",
            Action::ListUpdate | Action::ItemUpdate => "update",
            Action::ListDelete | Action::ItemDelete => "delete",
            Action::ListLeave => "leave",
            Action::ItemCreate | Action::InviteCreate => "create",
            Action::ItemToggle => "toggle",
            Action::InviteAccept => "accept",
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            Action::ListRead => "Not allowed to view this list",
            Action::ListUpdate => "Not allowed to edit this list",
            Action::ListDelete => "Not allowed to delete this list",
            Action::ListLeave => "You are not a member of this list.",
            Action::ItemCreate => "Not allowed to add items",
            Action::ItemRead => "Not allowed to view items of this list",
            Action::ItemUpdate => "Not allowed to edit this item",
            Action::ItemDelete => "Not allowed to delete this item",
            Action::ItemToggle => "Not allowed to change this item",
            Action::InviteCreate => "Only the list owner can invite users",
            Action::InviteAccept => "This invite is not addressed to you",
        }
    }
}

/// The caller's relation to the resource in question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessFacts {
    pub is_admin: bool,
    pub is_owner: bool,
    pub is_member: bool,
    pub is_creator: bool,
    pub is_invitee: bool,
}

impl AccessFacts {
    pub fn for_list(user: &AuthUser, list: &ShoppingList) -> Self {
        Self {
            is_admin: user.is_admin(),
            is_owner: list.is_owner(&user.id),
            is_member: list.is_member(&user.id),
            ..Default::default()
        }
    }

    /// Item facts; the parent list may already be gone since deletes do not cascade
    pub fn for_item(user: &AuthUser, item: &Item, list: Option<&ShoppingList>) -> Self {
        Self {
            is_admin: user.is_admin(),
            is_owner: list.map(|l| l.is_owner(&user.id)).unwrap_or(false),
            is_member: list.map(|l| l.is_member(&user.id)).unwrap_or(false),
            is_creator: item.added_by == user.id,
            is_invitee: false,
        }
    }

    pub fn for_invite(user: &AuthUser, invite: &Invite) -> Self {
        Self {
            is_admin: user.is_admin(),
            is_invitee: invite.user_id == user.id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    /// The request makes no sense for this caller (the owner leaving their own list)
    Illegal,
}

pub fn decide(action: Action, facts: AccessFacts) -> Decision {
    let allowed = match action {
        Action::ListRead | Action::ItemRead => facts.is_admin || facts.is_owner || facts.is_member,
        Action::ListUpdate | Action::ListDelete | Action::InviteCreate => facts.is_admin || facts.is_owner,
        Action::ListLeave => {
            if facts.is_owner {
                return Decision::Illegal;
            }
            facts.is_member
        }
        Action::ItemCreate | Action::ItemToggle => true,
        Action::ItemUpdate | Action::ItemDelete => facts.is_admin || facts.is_owner || facts.is_creator,
        Action::InviteAccept => facts.is_invitee,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// `decide` mapped onto the error taxonomy
pub fn check(action: Action, facts: AccessFacts) -> Result<(), ApiError> {
    match decide(action, facts) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            let key = format!("{}.{}.forbidden", action.resource(), action.name());
            tracing::warn!("Denied {:?}: {}", action, key);
            Err(ApiError::forbidden(key, action.denial_message()))
        }
        Decision::Illegal => Err(ApiError::illegal_state(
            format!("{}.{}.owner", action.resource(), action.name()),
            "Owner cannot leave own list - delete the list instead",
        )),
    }
}

/// Global role gate: Administrators always pass, everyone else needs one of `required`
pub fn authorize(user: &AuthUser, required: &[Role], base: &str) -> Result<(), ApiError> {
    if user.is_admin() || user.has_any_role(required) {
        return Ok(());
    }

    tracing::warn!("User {} lacks roles {:?} for {}", user.id, required, base);
    Err(ApiError::forbidden(format!("{}.forbidden", base), "User not authorized"))
}
