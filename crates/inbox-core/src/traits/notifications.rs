//! Notification dispatch port

use async_trait::async_trait;

use crate::entities::NewMessageNotification;
use crate::error::DomainError;

/// Delivers out-of-band notifications (email, push, webhook, ...).
///
/// Callers treat dispatch as fire-and-forget: an error is logged and never
/// affects the message that triggered it.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: NewMessageNotification) -> Result<(), DomainError>;
}
