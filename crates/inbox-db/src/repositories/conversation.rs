//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use inbox_core::entities::{Conversation, ConversationOverview};
use inbox_core::error::DomainError;
use inbox_core::traits::{ConversationRepository, RepoResult};
use inbox_core::value_objects::Snowflake;

use crate::models::{ConversationModel, ConversationOverviewModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, user_a, user_b, created_at
            FROM conversations
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_by_participants(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, user_a, user_b, created_at
            FROM conversations
            WHERE (user_a = $1 AND user_b = $2)
               OR (user_a = $2 AND user_b = $1)
            LIMIT 1
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO conversations (id, user_a, user_b, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(conversation.id.into_inner())
        .bind(conversation.user_a.into_inner())
        .bind(conversation.user_b.into_inner())
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ConversationExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_participant(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<ConversationOverview>> {
        let rows = sqlx::query_as::<_, ConversationOverviewModel>(
            r"
            SELECT c.id, c.user_a, c.user_b, c.created_at,
                   lm.id         AS last_message_id,
                   lm.sender_id  AS last_sender_id,
                   lm.body       AS last_body,
                   lm.created_at AS last_created_at,
                   lm.is_read    AS last_is_read,
                   (
                       SELECT COUNT(*)
                       FROM messages u
                       WHERE u.conversation_id = c.id
                         AND u.sender_id <> $1
                         AND NOT u.is_read
                   ) AS unread_count
            FROM conversations c
            LEFT JOIN LATERAL (
                SELECT m.id, m.sender_id, m.body, m.created_at, m.is_read
                FROM messages m
                WHERE m.conversation_id = c.id
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT 1
            ) lm ON TRUE
            WHERE c.user_a = $1 OR c.user_b = $1
            ORDER BY lm.created_at DESC NULLS LAST, c.created_at DESC, c.id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ConversationOverview::from).collect())
    }
}
