//! PostgreSQL implementation of the user directory

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use inbox_core::entities::User;
use inbox_core::error::DomainError;
use inbox_core::traits::{RepoResult, UserRepository};
use inbox_core::value_objects::Snowflake;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, email, name, notify_on_new_messages, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, name, notify_on_new_messages, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.notify_on_new_messages)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::ValidationError(format!("user {} already exists", user.id))
            })
        })?;

        Ok(())
    }
}
