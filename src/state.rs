use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, RepositoryError, Store};

/// Shared by every handler through axum's `State` extractor
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            http: reqwest::Client::new(),
        }
    }

    /// Build the store selected by `database.backend`, bootstrapping the schema for PostgreSQL
    pub async fn from_config(config: AppConfig) -> Result<Self, RepositoryError> {
        let store: Arc<dyn Store> = match config.database.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database).await?;
                DatabaseManager::bootstrap(&pool).await?;
                Arc::new(PgStore::new(pool))
            }
        };
        tracing::info!("Using {} store", store.backend());
        Ok(Self::new(config, store))
    }
}
