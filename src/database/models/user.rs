use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Application user, keyed by the auth provider's subject id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data presented at login, used to create or refresh a `User`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl User {
    /// First sighting of a subject: every new user starts with the `User` role
    pub fn from_profile(profile: UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            picture: profile.picture,
            roles: vec![Role::User],
            created_at: now,
            updated_at: now,
        }
    }

    /// Subsequent logins refresh the display fields only
    pub fn refresh(&mut self, profile: &UserProfile, now: DateTime<Utc>) {
        self.name = profile.name.clone();
        self.picture = profile.picture.clone();
        self.updated_at = now;
    }
}
