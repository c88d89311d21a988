//! Log-only notification dispatcher

use async_trait::async_trait;
use tracing::info;

use inbox_core::entities::NewMessageNotification;
use inbox_core::error::DomainError;
use inbox_core::traits::NotificationDispatcher;

/// Records notifications as structured log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationDispatcher for LogNotifier {
    async fn dispatch(&self, notification: NewMessageNotification) -> Result<(), DomainError> {
        info!(
            conversation_id = %notification.conversation_id,
            recipient_id = %notification.recipient_id,
            recipient_email = %notification.recipient_email,
            sender_name = %notification.sender_name,
            is_new_conversation = notification.is_new_conversation,
            "New message notification"
        );
        Ok(())
    }
}
