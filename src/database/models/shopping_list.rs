use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Maximum list name length in characters
pub const MAX_LIST_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub owner_id: String,
    /// Never contains `owner_id`
    pub members: BTreeSet<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl ShoppingList {
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let owner_id = owner_id.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            updated_by: Some(owner_id.clone()),
            owner_id,
            members: BTreeSet::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }

    /// Owner or member
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.is_owner(user_id) || self.is_member(user_id)
    }
}
