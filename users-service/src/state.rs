//! Application state shared across handlers

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    config::Config, database, error::Result, repository::SqlxUserRepository,
};

/// Application state shared across handlers
///
/// Built once at startup and handed to the router. Cloning is cheap: the
/// configuration is behind an `Arc` and the pool is reference counted.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    users: SqlxUserRepository,
}

impl AppState {
    /// Create state from a configuration and an already connected pool
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self {
            config: Arc::new(config),
            users: SqlxUserRepository::new(pool),
        }
    }

    /// Connect to the configured database and build the state
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = database::create_pool(&config.database).await?;
        Ok(Self::new(config, pool))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// User persistence
    pub fn users(&self) -> &SqlxUserRepository {
        &self.users
    }

    /// The database pool
    pub fn db(&self) -> &SqlitePool {
        self.users.pool()
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.db().close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_with_in_memory_database() {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_retries = 0;

        let state = AppState::connect(config).await.unwrap();
        assert_eq!(state.config().service.port, 5000);
        assert!(!state.db().is_closed());

        state.close().await;
        assert!(state.db().is_closed());
    }
}
