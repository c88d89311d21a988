//! When a new message deserves a notification

use chrono::{DateTime, Duration, Utc};

use inbox_core::entities::{Message, User};

/// Rule for notifying the recipient of a new message
#[derive(Debug, Clone, Copy)]
pub struct NotificationPolicy {
    dormant_after: Duration,
}

/// Why a notification fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First message of the conversation
    NewConversation,
    /// Previous message is older than the dormancy threshold
    Renewed,
}

impl NotificationPolicy {
    pub fn new(dormant_after: Duration) -> Self {
        Self { dormant_after }
    }

    /// Decide based on the message preceding the one just sent
    pub fn evaluate(
        &self,
        previous: Option<&Message>,
        now: DateTime<Utc>,
        recipient: &User,
    ) -> Option<Trigger> {
        if !recipient.notify_on_new_messages {
            return None;
        }
        match previous {
            None => Some(Trigger::NewConversation),
            Some(prev) if now - prev.created_at >= self.dormant_after => Some(Trigger::Renewed),
            Some(_) => None,
        }
    }
}
