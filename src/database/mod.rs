pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{InviteRepository, ItemRepository, ListRepository, Store, UserRepository};

use thiserror::Error;

/// Errors surfaced by any persistence backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    DataCorruption(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
