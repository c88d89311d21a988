//! Message entity <-> model mapper

use inbox_core::entities::Message;
use inbox_core::value_objects::Snowflake;

use crate::models::MessageModel;

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            sender_id: Snowflake::new(model.sender_id),
            body: model.body,
            created_at: model.created_at,
            is_read: model.is_read,
        }
    }
}
