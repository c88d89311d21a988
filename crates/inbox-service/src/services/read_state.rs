//! Read-state service
//!
//! Flips per-message read flags for the non-sending participant and answers
//! unread counts. Every update is conditional, so repeating a call is harmless.

use inbox_core::entities::Conversation;
use inbox_core::Snowflake;
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;

pub struct ReadStateService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadStateService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark every message addressed to `reader_id` in the conversation as read
    #[instrument(skip(self))]
    pub async fn mark_all_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
    ) -> ServiceResult<u64> {
        let conversation = ConversationService::new(self.ctx)
            .authorize(conversation_id, reader_id)
            .await?;
        self.mark_all_read_authorized(&conversation, reader_id).await
    }

    /// Same as [`Self::mark_all_read`] for a conversation the caller already authorized
    pub async fn mark_all_read_authorized(
        &self,
        conversation: &Conversation,
        reader_id: Snowflake,
    ) -> ServiceResult<u64> {
        let changed = self
            .ctx
            .message_repo()
            .mark_all_read(conversation.id, reader_id)
            .await?;
        if changed > 0 {
            debug!(conversation_id = %conversation.id, reader_id = %reader_id, changed, "Marked read");
        }
        Ok(changed)
    }

    /// Mark one delivered message as read; no-op for the sender or an already read message
    #[instrument(skip(self))]
    pub async fn mark_one_read(
        &self,
        message_id: Snowflake,
        reader_id: Snowflake,
    ) -> ServiceResult<bool> {
        Ok(self.ctx.message_repo().mark_read(message_id, reader_id).await?)
    }

    /// Unread messages addressed to `user_id` across all conversations
    pub async fn unread_count(&self, user_id: Snowflake) -> ServiceResult<i64> {
        Ok(self.ctx.message_repo().count_unread(user_id).await?)
    }

    pub async fn unread_count_for_conversation(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<i64> {
        ConversationService::new(self.ctx)
            .authorize(conversation_id, user_id)
            .await?;
        Ok(self
            .ctx
            .message_repo()
            .count_unread_in_conversation(conversation_id, user_id)
            .await?)
    }
}
