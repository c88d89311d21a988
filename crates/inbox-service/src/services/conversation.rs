//! Conversation service
//!
//! Create-or-fetch, authorization and listing of two-party conversations.

use std::collections::HashMap;

use inbox_core::entities::{Conversation, User};
use inbox_core::{DomainError, MessageOrder, MessageQuery, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{
    ConversationDetail, ConversationSummary, MessagePage, MessageResponse, OpenConversationResponse,
    PageMeta,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::read_state::ReadStateService;

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the conversation between two users, creating it if needed.
    ///
    /// The flag is `true` when this call created it. Concurrent callers for
    /// the same pair, in either order, all end up with the same conversation.
    #[instrument(skip(self))]
    pub async fn find_or_create(
        &self,
        initiator_id: Snowflake,
        recipient_id: Snowflake,
    ) -> ServiceResult<(Conversation, bool)> {
        if initiator_id == recipient_id {
            return Err(DomainError::InvalidParticipants.into());
        }

        self.ctx
            .user_repo()
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", recipient_id.to_string()))?;

        if let Some(existing) = self
            .ctx
            .conversation_repo()
            .find_by_participants(initiator_id, recipient_id)
            .await?
        {
            return Ok((existing, false));
        }

        let conversation = Conversation::new(self.ctx.generate_id(), initiator_id, recipient_id);
        match self.ctx.conversation_repo().create(&conversation).await {
            Ok(()) => {
                info!(
                    conversation_id = %conversation.id,
                    initiator_id = %initiator_id,
                    recipient_id = %recipient_id,
                    "Conversation created"
                );
                Ok((conversation, true))
            }
            Err(DomainError::ConversationExists) => {
                // Lost the race against a concurrent create for the same pair
                debug!("Conversation created concurrently, re-reading");
                let existing = self
                    .ctx
                    .conversation_repo()
                    .find_by_participants(initiator_id, recipient_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::internal("conversation vanished after unique violation")
                    })?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create-or-fetch, shaped for the API
    pub async fn open(
        &self,
        initiator_id: Snowflake,
        recipient_id: Snowflake,
    ) -> ServiceResult<OpenConversationResponse> {
        let (conversation, created) = self.find_or_create(initiator_id, recipient_id).await?;
        let other = self.other_user(&conversation, initiator_id).await?;
        let unread = if created {
            0
        } else {
            self.ctx
                .message_repo()
                .count_unread_in_conversation(conversation.id, initiator_id)
                .await?
        };
        let last = self.ctx.message_repo().find_latest(conversation.id).await?;

        Ok(OpenConversationResponse {
            created,
            conversation: ConversationSummary::new(&conversation, &other, last.as_ref(), unread),
        })
    }

    pub async fn get(&self, conversation_id: Snowflake) -> ServiceResult<Conversation> {
        self.ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id.to_string()))
    }

    /// Load a conversation and check that `user_id` takes part in it
    pub async fn authorize(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Conversation> {
        let conversation = self.get(conversation_id).await?;
        if !conversation.is_participant(user_id) {
            return Err(DomainError::NotParticipant.into());
        }
        Ok(conversation)
    }

    /// Inbox listing for `user_id`, most recently active first
    #[instrument(skip(self))]
    pub async fn list_for_participant(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ConversationSummary>> {
        let overviews = self
            .ctx
            .conversation_repo()
            .list_for_participant(user_id)
            .await?;

        let mut users: HashMap<Snowflake, User> = HashMap::new();
        let mut summaries = Vec::with_capacity(overviews.len());
        for overview in overviews {
            let other_id = overview
                .conversation
                .other_participant(user_id)
                .ok_or(DomainError::NotParticipant)?;
            if !users.contains_key(&other_id) {
                let user = self.load_user(other_id).await?;
                users.insert(other_id, user);
            }
            let other = &users[&other_id];

            summaries.push(ConversationSummary::new(
                &overview.conversation,
                other,
                overview.last_message.as_ref(),
                overview.unread_count,
            ));
        }
        Ok(summaries)
    }

    /// Conversation view with messages oldest first; marks everything read for the viewer
    #[instrument(skip(self))]
    pub async fn detail(
        &self,
        conversation_id: Snowflake,
        viewer_id: Snowflake,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<ConversationDetail> {
        let conversation = self.authorize(conversation_id, viewer_id).await?;
        ReadStateService::new(self.ctx)
            .mark_all_read_authorized(&conversation, viewer_id)
            .await?;

        let other = self.other_user(&conversation, viewer_id).await?;
        let (messages, pagination) = self
            .page_of_messages(&conversation, MessageOrder::Ascending, page, page_size)
            .await?;

        Ok(ConversationDetail {
            id: conversation.id,
            other_user: other.into(),
            created_at: conversation.created_at,
            messages,
            pagination,
        })
    }

    /// Paged history, newest first. Does not change read state.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        conversation_id: Snowflake,
        viewer_id: Snowflake,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<MessagePage> {
        let conversation = self.authorize(conversation_id, viewer_id).await?;
        let (messages, pagination) = self
            .page_of_messages(&conversation, MessageOrder::Descending, page, page_size)
            .await?;
        Ok(MessagePage {
            messages,
            pagination,
        })
    }

    async fn page_of_messages(
        &self,
        conversation: &Conversation,
        order: MessageOrder,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<(Vec<MessageResponse>, PageMeta)> {
        let query = MessageQuery::page(order, page, page_size);
        // One extra row tells whether another page exists
        let lookahead = MessageQuery {
            limit: query.limit + 1,
            ..query
        };
        let mut messages = self
            .ctx
            .message_repo()
            .find_by_conversation(conversation.id, lookahead)
            .await?;

        let has_more = messages.len() as i64 > query.limit;
        messages.truncate(usize::try_from(query.limit).unwrap_or(0));

        let user_a = self.load_user(conversation.user_a).await?;
        let user_b = self.load_user(conversation.user_b).await?;
        let responses = messages
            .iter()
            .map(|m| {
                let sender = if m.sender_id == user_a.id { &user_a } else { &user_b };
                MessageResponse::from_message(m, sender.display_name())
            })
            .collect();

        let pagination = PageMeta {
            page: page.max(1),
            page_size: query.limit as u32,
            has_more,
        };
        Ok((responses, pagination))
    }

    async fn other_user(&self, conversation: &Conversation, user_id: Snowflake) -> ServiceResult<User> {
        let other_id = conversation
            .other_participant(user_id)
            .ok_or(DomainError::NotParticipant)?;
        self.load_user(other_id).await
    }

    async fn load_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }
}
