//! Response DTOs for API endpoints and gateway frames
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use inbox_core::Snowflake;
use serde::{Deserialize, Serialize};

// ============================================================================
// User Responses
// ============================================================================

/// The other participant of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Snowflake,
    pub name: String,
    pub email: String,
}

// ============================================================================
// Message Responses
// ============================================================================

/// A stored message as seen by clients
///
/// This is also the payload of the gateway broadcast frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Last message shown next to a conversation in the inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessagePreview {
    pub id: Snowflake,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub sender_id: Snowflake,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    /// Whether another page exists after this one
    pub has_more: bool,
}

/// One page of a conversation's history, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<MessageResponse>,
    pub pagination: PageMeta,
}

// ============================================================================
// Conversation Responses
// ============================================================================

/// Inbox entry for one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Snowflake,
    pub other_user: UserSummary,
    pub last_message: Option<LastMessagePreview>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of create-or-fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenConversationResponse {
    /// `false` when the conversation already existed
    pub created: bool,
    pub conversation: ConversationSummary,
}

/// Conversation view with messages in chronological order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub id: Snowflake,
    pub other_user: UserSummary,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
    pub pagination: PageMeta,
}

// ============================================================================
// Read State Responses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub marked_read: u64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    /// `healthy`, `unhealthy` or `not_configured` (in-memory storage)
    pub database: String,
    pub live_sessions: usize,
}

impl ReadinessResponse {
    /// `database` is `None` when no database is configured
    pub fn ready(database: Option<bool>, live_sessions: usize) -> Self {
        let healthy = database.unwrap_or(true);
        Self {
            status: if healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: match database {
                    Some(true) => "healthy",
                    Some(false) => "unhealthy",
                    None => "not_configured",
                }
                .to_string(),
                live_sessions,
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
