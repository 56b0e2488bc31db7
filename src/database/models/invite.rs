use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted by an invite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteRole {
    #[default]
    Member,
    Viewer,
    Editor,
    Admin,
}

impl InviteRole {
    pub const ALL: [InviteRole; 4] = [InviteRole::Member, InviteRole::Viewer, InviteRole::Editor, InviteRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            InviteRole::Member => "member",
            InviteRole::Viewer => "viewer",
            InviteRole::Editor => "editor",
            InviteRole::Admin => "admin",
        }
    }
}

impl std::str::FromStr for InviteRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InviteRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown invite role '{}'", s))
    }
}

/// Invitation of one user to one list. `pending -> accepted` is the only transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    /// Invitee
    pub user_id: String,
    pub role: InviteRole,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn new(shopping_list_id: Uuid, user_id: impl Into<String>, role: InviteRole, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            shopping_list_id,
            user_id: user_id.into(),
            role,
            accepted: false,
            created_at: now,
            accepted_at: None,
        }
    }
}
