use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::RepositoryError;

/// Schema applied on startup; every statement is idempotent.
///
/// `items.list_id` and `invites.shopping_list_id` are logical references only:
/// deleting a list leaves its items and invites in place.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id          TEXT PRIMARY KEY,
        name        TEXT,
        email       TEXT,
        picture     TEXT,
        roles       TEXT[] NOT NULL DEFAULT ARRAY['User'],
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS shopping_lists (
        id          UUID PRIMARY KEY,
        name        VARCHAR(100) NOT NULL CHECK (char_length(name) >= 1),
        owner_id    TEXT NOT NULL,
        members     TEXT[] NOT NULL DEFAULT '{}',
        is_archived BOOLEAN NOT NULL DEFAULT false,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_by  TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS shopping_lists_owner_idx ON shopping_lists (owner_id)",
    "CREATE INDEX IF NOT EXISTS shopping_lists_members_idx ON shopping_lists USING GIN (members)",
    r#"CREATE TABLE IF NOT EXISTS items (
        id           UUID PRIMARY KEY,
        list_id      UUID NOT NULL,
        name         TEXT NOT NULL,
        quantity     DOUBLE PRECISION NOT NULL DEFAULT 1,
        unit         TEXT NOT NULL DEFAULT '',
        note         TEXT NOT NULL DEFAULT '',
        is_completed BOOLEAN NOT NULL DEFAULT false,
        completed_by TEXT,
        added_by     TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS items_list_idx ON items (list_id)",
    r#"CREATE TABLE IF NOT EXISTS invites (
        id               UUID PRIMARY KEY,
        shopping_list_id UUID NOT NULL,
        user_id          TEXT NOT NULL,
        role             TEXT NOT NULL DEFAULT 'member',
        accepted         BOOLEAN NOT NULL DEFAULT false,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT now(),
        accepted_at      TIMESTAMPTZ
    )"#,
    "CREATE INDEX IF NOT EXISTS invites_user_idx ON invites (user_id)",
];

/// Connection pool setup and schema bootstrap for the PostgreSQL backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured database URL
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
        let url = config
            .url
            .as_deref()
            .ok_or(RepositoryError::ConfigMissing("DATABASE_URL"))?;
        let url = Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!(
            "Created database pool (max {} connections) for: {}",
            config.max_connections,
            Self::redacted(&url)
        );
        Ok(pool)
    }

    /// Create tables and indexes if they are missing
    pub async fn bootstrap(pool: &PgPool) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            pool.execute(*statement).await?;
        }
        info!("Database schema ready ({} statements)", SCHEMA.len());
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn validate_url(raw: &str) -> Result<String, RepositoryError> {
        let url = url::Url::parse(raw).map_err(|_| RepositoryError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(RepositoryError::InvalidDatabaseUrl),
        }
    }

    /// Connection string without the password, for logs
    fn redacted(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
