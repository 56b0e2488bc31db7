use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::models::{Invite, Item, ItemChanges, ShoppingList, User, UserProfile};
use crate::database::repository::{InviteRepository, ItemRepository, ListRepository, Store, UserRepository};
use crate::database::RepositoryError;

const LIST_COLUMNS: &str = "id, name, owner_id, members, is_archived, created_at, updated_at, updated_by";
const ITEM_COLUMNS: &str =
    "id, list_id, name, quantity, unit, note, is_completed, completed_by, added_by, created_at, updated_at";
const INVITE_COLUMNS: &str = "id, shopping_list_id, user_id, role, accepted, created_at, accepted_at";
const USER_COLUMNS: &str = "id, name, email, picture, roles, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ListRow {
    id: Uuid,
    name: String,
    owner_id: String,
    members: Vec<String>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    updated_by: Option<String>,
}

impl From<ListRow> for ShoppingList {
    fn from(row: ListRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            members: row.members.into_iter().filter(|m| *m != row.owner_id).collect(),
            owner_id: row.owner_id,
            is_archived: row.is_archived,
            created_at: row.created_at,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    list_id: Uuid,
    name: String,
    quantity: f64,
    unit: String,
    note: String,
    is_completed: bool,
    completed_by: Option<String>,
    added_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            list_id: row.list_id,
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
            note: row.note,
            is_completed: row.is_completed,
            completed_by: row.completed_by,
            added_by: row.added_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct InviteRow {
    id: Uuid,
    shopping_list_id: Uuid,
    user_id: String,
    role: String,
    accepted: bool,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

impl TryFrom<InviteRow> for Invite {
    type Error = RepositoryError;

    fn try_from(row: InviteRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("invite {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            shopping_list_id: row.shopping_list_id,
            user_id: row.user_id,
            role,
            accepted: row.accepted,
            created_at: row.created_at,
            accepted_at: row.accepted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            picture: row.picture,
            roles: row.roles.iter().filter_map(|r| Role::parse(r)).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn invites_from_rows(rows: Vec<InviteRow>) -> Result<Vec<Invite>, RepositoryError> {
    rows.into_iter().map(Invite::try_from).collect()
}

#[async_trait]
impl ListRepository for PgStore {
    async fn all_lists(&self) -> Result<Vec<ShoppingList>, RepositoryError> {
        let sql = format!("SELECT {} FROM shopping_lists ORDER BY created_at", LIST_COLUMNS);
        let rows = sqlx::query_as::<_, ListRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ShoppingList::from).collect())
    }

    async fn lists_visible_to(&self, user_id: &str) -> Result<Vec<ShoppingList>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM shopping_lists WHERE owner_id = $1 OR $1 = ANY(members) ORDER BY created_at",
            LIST_COLUMNS
        );
        let rows = sqlx::query_as::<_, ListRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ShoppingList::from).collect())
    }

    async fn find_list(&self, id: Uuid) -> Result<Option<ShoppingList>, RepositoryError> {
        let sql = format!("SELECT {} FROM shopping_lists WHERE id = $1", LIST_COLUMNS);
        let row = sqlx::query_as::<_, ListRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ShoppingList::from))
    }

    async fn insert_list(&self, list: &ShoppingList) -> Result<(), RepositoryError> {
        let members: Vec<&str> = list.members.iter().map(String::as_str).collect();
        sqlx::query(
            "INSERT INTO shopping_lists (id, name, owner_id, members, is_archived, created_at, updated_at, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(&list.owner_id)
        .bind(&members)
        .bind(list.is_archived)
        .bind(list.created_at)
        .bind(list.updated_at)
        .bind(&list.updated_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn rename_list(
        &self,
        id: Uuid,
        name: &str,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let sql = format!(
            "UPDATE shopping_lists SET name = $2, updated_by = $3, updated_at = $4 WHERE id = $1 RETURNING {}",
            LIST_COLUMNS
        );
        let row = sqlx::query_as::<_, ListRow>(&sql)
            .bind(id)
            .bind(name)
            .bind(updated_by)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ShoppingList::from))
    }

    async fn delete_list(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, id: Uuid, user_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shopping_lists SET members = array_remove(members, $2), updated_at = now()
             WHERE id = $1 AND $2 = ANY(members)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ItemRepository for PgStore {
    async fn items_for_list(&self, list_id: Uuid) -> Result<Vec<Item>, RepositoryError> {
        let sql = format!("SELECT {} FROM items WHERE list_id = $1 ORDER BY created_at", ITEM_COLUMNS);
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(list_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn find_item(&self, id: Uuid) -> Result<Option<Item>, RepositoryError> {
        let sql = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Item::from))
    }

    async fn insert_item(&self, item: &Item) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO items (id, list_id, name, quantity, unit, note, is_completed, completed_by, added_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(item.id)
        .bind(item.list_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(&item.note)
        .bind(item.is_completed)
        .bind(&item.completed_by)
        .bind(&item.added_by)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_item_details(
        &self,
        id: Uuid,
        changes: &ItemChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, RepositoryError> {
        let sql = format!(
            "UPDATE items SET name = COALESCE($2, name), quantity = COALESCE($3, quantity),
                unit = COALESCE($4, unit), note = COALESCE($5, note), updated_at = $6
             WHERE id = $1 RETURNING {}",
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(changes.quantity)
            .bind(changes.unit.as_deref())
            .bind(changes.note.as_deref())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Item::from))
    }

    async fn set_item_completed(
        &self,
        id: Uuid,
        completed: bool,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Item>, RepositoryError> {
        let sql = format!(
            "UPDATE items SET is_completed = $2, completed_by = CASE WHEN $2 THEN $3 ELSE NULL END, updated_at = $4
             WHERE id = $1 RETURNING {}",
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .bind(completed)
            .bind(user_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Item::from))
    }

    async fn delete_item(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InviteRepository for PgStore {
    async fn all_invites(&self) -> Result<Vec<Invite>, RepositoryError> {
        let sql = format!("SELECT {} FROM invites ORDER BY created_at", INVITE_COLUMNS);
        let rows = sqlx::query_as::<_, InviteRow>(&sql).fetch_all(&self.pool).await?;
        invites_from_rows(rows)
    }

    async fn invites_for_user(&self, user_id: &str) -> Result<Vec<Invite>, RepositoryError> {
        let sql = format!("SELECT {} FROM invites WHERE user_id = $1 ORDER BY created_at", INVITE_COLUMNS);
        let rows = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        invites_from_rows(rows)
    }

    async fn find_invite(&self, id: Uuid) -> Result<Option<Invite>, RepositoryError> {
        let sql = format!("SELECT {} FROM invites WHERE id = $1", INVITE_COLUMNS);
        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Invite::try_from).transpose()
    }

    async fn insert_invite(&self, invite: &Invite) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO invites (id, shopping_list_id, user_id, role, accepted, created_at, accepted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(invite.id)
        .bind(invite.shopping_list_id)
        .bind(&invite.user_id)
        .bind(invite.role.as_str())
        .bind(invite.accepted)
        .bind(invite.created_at)
        .bind(invite.accepted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn accept_invite(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Invite>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {} FROM invites WHERE id = $1 FOR UPDATE", INVITE_COLUMNS);
        let Some(row) = sqlx::query_as::<_, InviteRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let invite = Invite::try_from(row)?;
        if invite.accepted {
            return Ok(Some(invite));
        }

        let update = format!(
            "UPDATE invites SET accepted = true, accepted_at = $2 WHERE id = $1 RETURNING {}",
            INVITE_COLUMNS
        );
        let accepted = sqlx::query_as::<_, InviteRow>(&update)
            .bind(id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        // Set semantics: never duplicate a member, never add the owner
        let added = sqlx::query(
            "UPDATE shopping_lists SET members = array_append(members, $2), updated_at = $3
             WHERE id = $1 AND owner_id <> $2 AND NOT ($2 = ANY(members))",
        )
        .bind(invite.shopping_list_id)
        .bind(&invite.user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if added.rows_affected() == 0 {
            tracing::debug!(
                "Invite {} accepted without membership change on list {}",
                invite.id,
                invite.shopping_list_id
            );
        }
        Invite::try_from(accepted).map(Some)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn upsert_user(&self, profile: UserProfile, now: DateTime<Utc>) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, picture, roles, created_at, updated_at)
             VALUES ($1, $2, $3, $4, ARRAY['User'], $5, $5)
             ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, picture = EXCLUDED.picture, updated_at = EXCLUDED.updated_at
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&profile.id)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.picture)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(User::from(row))
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
