//! Conversation entity - a durable two-party direct message thread

use chrono::{DateTime, Utc};

use crate::entities::Message;
use crate::value_objects::Snowflake;

/// Direct message conversation between two distinct users.
///
/// `user_a` is the participant who opened the conversation. The pair is
/// otherwise unordered: at most one conversation exists for `{a, b}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub user_a: Snowflake,
    pub user_b: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: Snowflake, initiator: Snowflake, recipient: Snowflake) -> Self {
        Self {
            id,
            user_a: initiator,
            user_b: recipient,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_participant(&self, user_id: Snowflake) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    /// The participant that is not `user_id`, or `None` if `user_id` is not
    /// part of this conversation.
    pub fn other_participant(&self, user_id: Snowflake) -> Option<Snowflake> {
        if self.user_a == user_id {
            Some(self.user_b)
        } else if self.user_b == user_id {
            Some(self.user_a)
        } else {
            None
        }
    }

    /// Order-independent key for the participant pair
    #[inline]
    pub fn pair_key(&self) -> (Snowflake, Snowflake) {
        Self::key_for(self.user_a, self.user_b)
    }

    #[inline]
    pub fn key_for(a: Snowflake, b: Snowflake) -> (Snowflake, Snowflake) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// A conversation as listed for one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationOverview {
    pub conversation: Conversation,
    pub last_message: Option<Message>,
    /// Unread messages addressed to the viewing participant
    pub unread_count: i64,
}
