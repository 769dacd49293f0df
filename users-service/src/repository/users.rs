//! sqlx-backed user repository

use chrono::Utc;
use sqlx::SqlitePool;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Repository, RepositoryResult};
use crate::models::{User, UserPayload};

const ENTITY: &str = "User";

/// User persistence over a SQLite connection pool
///
/// Cloning is cheap; the pool is reference counted.
#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a repository on top of an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Repository<i64, User, UserPayload, UserPayload> for SqlxUserRepository {
    async fn find_by_id(&self, id: &i64) -> RepositoryResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(*id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::FindById, e)
                .with_entity(ENTITY, id.to_string())
        })
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::FindAll, e))
    }

    async fn create(&self, data: UserPayload) -> RepositoryResult<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(RepositoryOperation::Create, e))?;

        tracing::debug!(user_id = user.id, "User row inserted");
        Ok(user)
    }

    async fn update(&self, id: &i64, data: UserPayload) -> RepositoryResult<User> {
        // Both columns are written as given; a missing value becomes NULL
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = ?, email = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(Utc::now())
        .bind(*id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_sqlx(RepositoryOperation::Update, e)
                .with_entity(ENTITY, id.to_string())
        })?
        .ok_or_else(|| {
            RepositoryError::not_found(ENTITY, id.to_string())
                .with_operation(RepositoryOperation::Update)
        })
    }

    async fn delete(&self, id: &i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(*id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_sqlx(RepositoryOperation::Delete, e)
                    .with_entity(ENTITY, id.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;
    use crate::repository::RepositoryErrorKind;

    async fn repository() -> SqlxUserRepository {
        SqlxUserRepository::new(connect_in_memory().await.expect("in-memory database"))
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = repository().await;

        let ana = repo.create(UserPayload::new("Ana", "ana@x.com")).await.unwrap();
        let bob = repo.create(UserPayload::new("Bob", "bob@x.com")).await.unwrap();

        assert_eq!(ana.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.created_at, ana.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let repo = repository().await;

        let err = repo
            .create(UserPayload {
                name: Some("Ana".to_string()),
                email: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.operation, RepositoryOperation::Create);
        assert_eq!(err.kind, RepositoryErrorKind::ConstraintViolation);
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_missing_returns_none() {
        let repo = repository().await;
        assert_eq!(repo.find_by_id(&99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_overwrites_both_fields() {
        let repo = repository().await;
        let ana = repo.create(UserPayload::new("Ana", "ana@x.com")).await.unwrap();

        let updated = repo
            .update(&ana.id, UserPayload::new("Ana B", "ana.b@x.com"))
            .await
            .unwrap();

        assert_eq!(updated.id, ana.id);
        assert_eq!(updated.name, "Ana B");
        assert_eq!(updated.email, "ana.b@x.com");
        assert_eq!(updated.created_at, ana.created_at);
        assert!(updated.updated_at >= ana.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let repo = repository().await;

        let err = repo
            .update(&5, UserPayload::new("Nobody", "nobody@x.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, RepositoryErrorKind::NotFound);
        assert_eq!(err.operation, RepositoryOperation::Update);
        assert_eq!(err.entity_id.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_row_was_removed() {
        let repo = repository().await;
        let ana = repo.create(UserPayload::new("Ana", "ana@x.com")).await.unwrap();

        assert!(repo.delete(&ana.id).await.unwrap());
        assert!(!repo.delete(&ana.id).await.unwrap());
        assert_eq!(repo.find_by_id(&ana.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = repository().await;
        let first = repo.create(UserPayload::new("Ana", "ana@x.com")).await.unwrap();
        repo.delete(&first.id).await.unwrap();

        let second = repo.create(UserPayload::new("Bob", "bob@x.com")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let repo = repository().await;
        repo.pool().close().await;

        let err = repo.find_all().await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ConnectionFailed);
    }
}
