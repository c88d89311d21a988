//! Conversation database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub created_at: DateTime<Utc>,
}

/// Conversation joined with its latest message and the viewer's unread count.
/// The `last_*` columns are all NULL for a conversation without messages.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationOverviewModel {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub created_at: DateTime<Utc>,
    pub last_message_id: Option<i64>,
    pub last_sender_id: Option<i64>,
    pub last_body: Option<String>,
    pub last_created_at: Option<DateTime<Utc>>,
    pub last_is_read: Option<bool>,
    pub unread_count: i64,
}
