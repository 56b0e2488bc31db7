use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Invite, Item, ItemChanges, ShoppingList, User, UserProfile};
use crate::database::repository::{InviteRepository, ItemRepository, ListRepository, Store, UserRepository};
use crate::database::RepositoryError;

#[derive(Default)]
struct Tables {
    lists: HashMap<Uuid, ShoppingList>,
    items: HashMap<Uuid, Item>,
    invites: HashMap<Uuid, Invite>,
    users: HashMap<String, User>,
}

/// In-process store for development and tests.
///
/// All tables sit behind one lock, so multi-table writes (invite acceptance)
/// are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first<T, F>(mut rows: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    rows.sort_by_key(|row| created_at(row));
    rows
}

#[async_trait]
impl ListRepository for MemoryStore {
    async fn all_lists(&self) -> Result<Vec<ShoppingList>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(tables.lists.values().cloned().collect(), |l| l.created_at))
    }

    async fn lists_visible_to(&self, user_id: &str) -> Result<Vec<ShoppingList>, RepositoryError> {
        let tables = self.tables.read().await;
        let lists = tables
            .lists
            .values()
            .filter(|l| l.is_visible_to(user_id))
            .cloned()
            .collect();
        Ok(oldest_first(lists, |l| l.created_at))
    }

    async fn find_list(&self, id: Uuid) -> Result<Option<ShoppingList>, RepositoryError> {
        Ok(self.tables.read().await.lists.get(&id).cloned())
    }

    async fn insert_list(&self, list: &ShoppingList) -> Result<(), RepositoryError> {
        self.tables.write().await.lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn rename_list(
        &self,
        id: Uuid,
        name: &str,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.lists.get_mut(&id).map(|list| {
            list.name = name.to_string();
            list.updated_by = Some(updated_by.to_string());
            list.updated_at = now;
            list.clone()
        }))
    }

    async fn delete_list(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.lists.remove(&id).is_some())
    }

    async fn remove_member(&self, id: Uuid, user_id: &str) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .lists
            .get_mut(&id)
            .map(|list| list.members.remove(user_id))
            .unwrap_or(false))
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn items_for_list(&self, list_id: Uuid) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.tables.read().await;
        let items = tables
            .items
            .values()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect();
        Ok(oldest_first(items, |i| i.created_at))
    }

    async fn find_item(&self, id: Uuid) -> Result<Option<Item>, RepositoryError> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn insert_item(&self, item: &Item) -> Result<(), RepositoryError> {
        self.tables.write().await.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_item_details(
        &self,
        id: Uuid,
        changes: &ItemChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.items.get_mut(&id).map(|stored| {
            stored.apply(changes.clone(), now);
            stored.clone()
        }))
    }

    async fn set_item_completed(
        &self,
        id: Uuid,
        completed: bool,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.items.get_mut(&id).map(|stored| {
            stored.set_completed(completed, user_id, now);
            stored.clone()
        }))
    }

    async fn delete_item(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.tables.write().await.items.remove(&id).is_some())
    }
}

#[async_trait]
impl InviteRepository for MemoryStore {
    async fn all_invites(&self) -> Result<Vec<Invite>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(tables.invites.values().cloned().collect(), |i| i.created_at))
    }

    async fn invites_for_user(&self, user_id: &str) -> Result<Vec<Invite>, RepositoryError> {
        let tables = self.tables.read().await;
        let invites = tables
            .invites
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        Ok(oldest_first(invites, |i| i.created_at))
    }

    async fn find_invite(&self, id: Uuid) -> Result<Option<Invite>, RepositoryError> {
        Ok(self.tables.read().await.invites.get(&id).cloned())
    }

    async fn insert_invite(&self, invite: &Invite) -> Result<(), RepositoryError> {
        self.tables.write().await.invites.insert(invite.id, invite.clone());
        Ok(())
    }

    async fn accept_invite(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Invite>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Tables { lists, invites, .. } = &mut *tables;

        let Some(invite) = invites.get_mut(&id) else {
            return Ok(None);
        };
        if invite.accepted {
            return Ok(Some(invite.clone()));
        }

        invite.accepted = true;
        invite.accepted_at = Some(now);

        match lists.get_mut(&invite.shopping_list_id) {
            Some(list) if !list.is_owner(&invite.user_id) => {
                list.members.insert(invite.user_id.clone());
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    "Invite {} accepted for missing list {}",
                    invite.id,
                    invite.shopping_list_id
                );
            }
        }

        Ok(Some(invite.clone()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert_user(&self, profile: UserProfile, now: DateTime<Utc>) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = match tables.users.get_mut(&profile.id) {
            Some(user) => {
                user.refresh(&profile, now);
                user.clone()
            }
            None => {
                let user = User::from_profile(profile, now);
                tables.users.insert(user.id.clone(), user.clone());
                user
            }
        };
        Ok(user)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
