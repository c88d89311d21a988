//! Conversions from domain entities to response DTOs

use inbox_core::entities::{Conversation, Message, User};

use super::responses::{ConversationSummary, LastMessagePreview, MessageResponse, UserSummary};

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.display_name().to_string(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&Message> for LastMessagePreview {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            body: message.body.clone(),
            created_at: message.created_at,
            sender_id: message.sender_id,
        }
    }
}

impl MessageResponse {
    /// Build the client view of a message; the sender's name is resolved by the caller
    pub fn from_message(message: &Message, sender_name: impl Into<String>) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            sender_name: sender_name.into(),
            body: message.body.clone(),
            created_at: message.created_at,
            is_read: message.is_read,
        }
    }
}

impl ConversationSummary {
    pub fn new(
        conversation: &Conversation,
        other_user: &User,
        last_message: Option<&Message>,
        unread_count: i64,
    ) -> Self {
        Self {
            id: conversation.id,
            other_user: UserSummary::from(other_user),
            last_message: last_message.map(LastMessagePreview::from),
            unread_count,
            created_at: conversation.created_at,
        }
    }
}
