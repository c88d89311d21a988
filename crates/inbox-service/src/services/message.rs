//! Message service
//!
//! The single write path for messages, shared by the gateway and the REST
//! API: validate, append, publish live, then decide on a notification.

use std::sync::Arc;

use chrono::Utc;
use inbox_core::entities::{Message, NewMessageNotification, User};
use inbox_core::{DomainError, Snowflake};
use tracing::{debug, info, instrument, warn};

use crate::dto::MessageResponse;
use crate::notify::{NotificationPolicy, Trigger};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a message from `sender_id` and fan it out to the conversation's room.
    ///
    /// Appending and publishing happen while holding the conversation's
    /// sequencer lock, so storage order and delivery order agree. Nothing is
    /// stored or published when validation or authorization fails.
    #[instrument(skip(self, body))]
    pub async fn send_message(
        &self,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        body: &str,
    ) -> ServiceResult<MessageResponse> {
        let body = Message::normalize_body(body)?;

        let conversation = ConversationService::new(self.ctx)
            .authorize(conversation_id, sender_id)
            .await?;
        let recipient_id = conversation
            .other_participant(sender_id)
            .ok_or(DomainError::NotParticipant)?;

        let sender = self
            .ctx
            .user_repo()
            .find_by_id(sender_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", sender_id.to_string()))?;

        let (message, previous, response, delivered) = {
            let _guard = self.ctx.sequencer().acquire(conversation_id).await;

            let previous = self.ctx.message_repo().find_latest(conversation_id).await?;

            let mut message = Message::new(self.ctx.generate_id(), conversation_id, sender_id, &body)?;
            // Keep timestamps monotonic within the conversation even if the clock steps back
            if let Some(prev) = &previous {
                message.created_at = message.created_at.max(prev.created_at);
            }

            self.ctx.message_repo().create(&message).await?;

            let response = Arc::new(MessageResponse::from_message(&message, sender.display_name()));
            let delivered = self
                .ctx
                .publisher()
                .publish(conversation_id, Arc::clone(&response));
            (message, previous, response, delivered)
        };

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            delivered,
            "Message sent"
        );

        self.maybe_notify(&message, previous.as_ref(), &sender, recipient_id)
            .await;

        Ok(Arc::unwrap_or_clone(response))
    }

    /// Fire-and-forget notification for a new or revived conversation
    async fn maybe_notify(
        &self,
        message: &Message,
        previous: Option<&Message>,
        sender: &User,
        recipient_id: Snowflake,
    ) {
        let recipient = match self.ctx.user_repo().find_by_id(recipient_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(recipient_id = %recipient_id, "Recipient missing from user directory");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load recipient for notification");
                return;
            }
        };

        let policy = NotificationPolicy::new(self.ctx.settings().dormant_after);
        let Some(trigger) = policy.evaluate(previous, Utc::now(), &recipient) else {
            return;
        };

        let notification = NewMessageNotification {
            conversation_id: message.conversation_id,
            recipient_id,
            recipient_email: recipient.email.clone(),
            recipient_name: recipient.display_name().to_string(),
            sender_name: sender.display_name().to_string(),
            is_new_conversation: trigger == Trigger::NewConversation,
        };

        debug!(conversation_id = %message.conversation_id, ?trigger, "Dispatching notification");
        let notifier = self.ctx.notifier();
        tokio::spawn(async move {
            let conversation_id = notification.conversation_id;
            if let Err(e) = notifier.dispatch(notification).await {
                warn!(conversation_id = %conversation_id, error = %e, "Notification dispatch failed");
            }
        });
    }
}
