//! Database connection pool management

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    config::DatabaseConfig,
    error::{sanitize_url, DatabaseOperation, Error, Result},
};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// Create the connection pool with retry logic and make sure the schema exists
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = create_pool_with_retries(config, config.max_retries).await?;
    bootstrap_schema(&pool).await?;
    Ok(pool)
}

/// Open a private in-memory database with the schema in place
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is pinned to a single connection that is never recycled.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_retries: 0,
        ..DatabaseConfig::default()
    };
    create_pool(&config).await
}

/// Create the `users` table if it is missing
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_USERS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| Error::database(DatabaseOperation::Bootstrap, e))?;

    tracing::debug!("Schema bootstrap complete");
    Ok(())
}

/// Create a connection pool with configurable retries
///
/// Uses exponential backoff between attempts
async fn create_pool_with_retries(config: &DatabaseConfig, max_retries: u32) -> Result<SqlitePool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        url = %sanitize_url(&config.url),
                        "Database connection pool created"
                    );
                }
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    tracing::error!(
                        "Failed to connect to database after {} attempts: {}",
                        max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = backoff_delay(base_delay, attempt);
                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`, saturating
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2_u32
        .checked_pow(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Attempt to create a database pool (single try)
async fn try_create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| Error::database(DatabaseOperation::Connect, e))?;

    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.connection_timeout());

    pool_options = if is_in_memory(&config.url) {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    pool_options.connect_with(options).await.map_err(|e| {
        tracing::debug!(
            url = %sanitize_url(&config.url),
            category = categorize_db_error(&e),
            "Database connection failed"
        );
        Error::database(DatabaseOperation::Connect, e)
    })
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Categorize database error for better operator guidance
fn categorize_db_error(err: &sqlx::Error) -> &'static str {
    use sqlx::Error;
    match err {
        Error::Configuration(_) => "Configuration error",
        Error::Database(_) => "Database query error",
        Error::Io(_) => "I/O error - check the database path and permissions",
        Error::PoolTimedOut => "Connection pool timeout - database may be locked",
        Error::PoolClosed => "Connection pool closed",
        Error::WorkerCrashed => "Database worker crashed",
        _ => "Connection error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles_and_saturates() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 4), Duration::from_secs(16));

        assert_eq!(backoff_delay(base, 33), base.saturating_mul(u32::MAX));
        assert_eq!(backoff_delay(base, u32::MAX), base.saturating_mul(u32::MAX));
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:users?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://users.db?mode=rwc"));
    }

    #[test]
    fn test_categorize_db_error() {
        assert_eq!(categorize_db_error(&sqlx::Error::PoolClosed), "Connection pool closed");
        assert_eq!(
            categorize_db_error(&sqlx::Error::PoolTimedOut),
            "Connection pool timeout - database may be locked"
        );
    }

    #[tokio::test]
    async fn test_connect_in_memory_bootstraps_schema() {
        let pool = connect_in_memory().await.unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        bootstrap_schema(&pool).await.unwrap();
        bootstrap_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_retries: 0,
            ..DatabaseConfig::default()
        };

        let pool = create_pool(&config).await.unwrap();
        pool.close().await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_retries() {
        let config = DatabaseConfig {
            url: "sqlite:///nonexistent-dir/users.db".to_string(),
            max_retries: 0,
            ..DatabaseConfig::default()
        };

        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Database {
                operation: DatabaseOperation::Connect,
                ..
            }
        ));
    }
}
