//! PostgreSQL implementation of MessageRepository
//!
//! Every write is a single conditional statement so concurrent senders and
//! readers never race through a read-modify-write in application code.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use inbox_core::entities::Message;
use inbox_core::error::DomainError;
use inbox_core::traits::{MessageRepository, RepoResult};
use inbox_core::value_objects::{MessageOrder, MessageQuery, Snowflake};

use crate::models::MessageModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn conversation_exists(&self, conversation_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM conversations WHERE id = $1)")
            .bind(conversation_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, body, created_at, is_read
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, conversation_id = %message.conversation_id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO messages (id, conversation_id, sender_id, body, created_at, is_read)
            SELECT $1, c.id, $3, $4, $5, $6
            FROM conversations c
            WHERE c.id = $2 AND $3 IN (c.user_a, c.user_b)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.conversation_id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(&message.body)
        .bind(message.created_at)
        .bind(message.is_read)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(if self.conversation_exists(message.conversation_id).await? {
                DomainError::NotParticipant
            } else {
                DomainError::ConversationNotFound(message.conversation_id)
            });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let sql = match query.order {
            MessageOrder::Ascending => {
                r"
                SELECT id, conversation_id, sender_id, body, created_at, is_read
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at ASC, id ASC
                LIMIT $2 OFFSET $3
                "
            }
            MessageOrder::Descending => {
                r"
                SELECT id, conversation_id, sender_id, body, created_at, is_read
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
                "
            }
        };

        let results = sqlx::query_as::<_, MessageModel>(sql)
            .bind(conversation_id.into_inner())
            .bind(query.limit.max(1))
            .bind(query.offset.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_latest(&self, conversation_id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, body, created_at, is_read
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn mark_all_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET is_read = TRUE
            WHERE conversation_id = $1
              AND sender_id <> $2
              AND NOT is_read
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(reader_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, message_id: Snowflake, reader_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE messages m
            SET is_read = TRUE
            FROM conversations c
            WHERE m.id = $1
              AND c.id = m.conversation_id
              AND $2 IN (c.user_a, c.user_b)
              AND m.sender_id <> $2
              AND NOT m.is_read
            ",
        )
        .bind(message_id.into_inner())
        .bind(reader_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_unread(&self, user_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.user_a = $1 OR c.user_b = $1)
              AND m.sender_id <> $1
              AND NOT m.is_read
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_unread_in_conversation(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1
              AND sender_id <> $2
              AND NOT is_read
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
