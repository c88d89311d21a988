//! Conversation entity <-> model mapper

use inbox_core::entities::{Conversation, ConversationOverview, Message};
use inbox_core::value_objects::Snowflake;

use crate::models::{ConversationModel, ConversationOverviewModel};

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            user_a: Snowflake::new(model.user_a),
            user_b: Snowflake::new(model.user_b),
            created_at: model.created_at,
        }
    }
}

impl From<ConversationOverviewModel> for ConversationOverview {
    fn from(model: ConversationOverviewModel) -> Self {
        let conversation_id = Snowflake::new(model.id);

        let last_message = match (
            model.last_message_id,
            model.last_sender_id,
            model.last_body,
            model.last_created_at,
        ) {
            (Some(id), Some(sender_id), Some(body), Some(created_at)) => Some(Message {
                id: Snowflake::new(id),
                conversation_id,
                sender_id: Snowflake::new(sender_id),
                body,
                created_at,
                is_read: model.last_is_read.unwrap_or(false),
            }),
            _ => None,
        };

        ConversationOverview {
            conversation: Conversation {
                id: conversation_id,
                user_a: Snowflake::new(model.user_a),
                user_b: Snowflake::new(model.user_b),
                created_at: model.created_at,
            },
            last_message,
            unread_count: model.unread_count,
        }
    }
}
