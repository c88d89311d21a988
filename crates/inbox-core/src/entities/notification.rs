//! Notification payload for a message that opens or revives a conversation

use serde::Serialize;

use crate::value_objects::Snowflake;

/// Sent to the recipient of a message when the conversation is brand new or
/// has been dormant long enough to warrant a nudge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessageNotification {
    pub conversation_id: Snowflake,
    pub recipient_id: Snowflake,
    pub recipient_email: String,
    pub recipient_name: String,
    pub sender_name: String,
    /// `true` for a first message, `false` for a dormant conversation coming back to life
    pub is_new_conversation: bool,
}
