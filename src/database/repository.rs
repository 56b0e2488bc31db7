use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{Invite, Item, ItemChanges, ShoppingList, User, UserProfile};
use crate::database::RepositoryError;

#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Every list, oldest first
    async fn all_lists(&self) -> Result<Vec<ShoppingList>, RepositoryError>;

    /// Lists the user owns or is a member of, oldest first
    async fn lists_visible_to(&self, user_id: &str) -> Result<Vec<ShoppingList>, RepositoryError>;

    async fn find_list(&self, id: Uuid) -> Result<Option<ShoppingList>, RepositoryError>;

    async fn insert_list(&self, list: &ShoppingList) -> Result<(), RepositoryError>;

    /// Returns the renamed list, or `None` if it does not exist
    async fn rename_list(
        &self,
        id: Uuid,
        name: &str,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShoppingList>, RepositoryError>;

    /// Returns whether a list was removed. Items and invites are left in place.
    async fn delete_list(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Returns whether the user was a member before the call
    async fn remove_member(&self, id: Uuid, user_id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Items of one list, oldest first
    async fn items_for_list(&self, list_id: Uuid) -> Result<Vec<Item>, RepositoryError>;

    async fn find_item(&self, id: Uuid) -> Result<Option<Item>, RepositoryError>;

    async fn insert_item(&self, item: &Item) -> Result<(), RepositoryError>;

    /// Write only the fields present in `changes`. Completion state is left
    /// alone. Returns `None` if the item no longer exists.
    async fn update_item_details(
        &self,
        id: Uuid,
        changes: &ItemChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, RepositoryError>;

    /// Set the completion flag; `completed_by` is the user when done, cleared otherwise
    async fn set_item_completed(
        &self,
        id: Uuid,
        completed: bool,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, RepositoryError>;

    async fn delete_item(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    async fn all_invites(&self) -> Result<Vec<Invite>, RepositoryError>;

    /// Invites addressed to the user
    async fn invites_for_user(&self, user_id: &str) -> Result<Vec<Invite>, RepositoryError>;

    async fn find_invite(&self, id: Uuid) -> Result<Option<Invite>, RepositoryError>;

    async fn insert_invite(&self, invite: &Invite) -> Result<(), RepositoryError>;

    /// Mark the invite accepted and add the invitee to the list members as one
    /// atomic step. Accepting an already accepted invite changes nothing and
    /// returns it unchanged. Returns `None` if the invite does not exist.
    async fn accept_invite(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Invite>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the user on first login, refresh name and picture afterwards
    async fn upsert_user(&self, profile: UserProfile, now: DateTime<Utc>) -> Result<User, RepositoryError>;
}

/// A complete persistence backend
#[async_trait]
pub trait Store: ListRepository + ItemRepository + InviteRepository + UserRepository {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), RepositoryError>;
}
