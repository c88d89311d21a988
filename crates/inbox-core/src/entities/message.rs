//! Message entity - one message inside a conversation

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    /// Maximum body length in characters
    pub const MAX_BODY_LENGTH: usize = 4000;

    /// Create an unread message after trimming and validating its body
    pub fn new(
        id: Snowflake,
        conversation_id: Snowflake,
        sender_id: Snowflake,
        body: &str,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            conversation_id,
            sender_id,
            body: Self::normalize_body(body)?,
            created_at: Utc::now(),
            is_read: false,
        })
    }

    /// Trim surrounding whitespace and reject blank or oversized bodies
    pub fn normalize_body(body: &str) -> Result<String, DomainError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyBody);
        }
        if trimmed.chars().count() > Self::MAX_BODY_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: Self::MAX_BODY_LENGTH,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Whether `reader_id` would flip this message to read
    #[inline]
    pub fn is_unread_for(&self, reader_id: Snowflake) -> bool {
        !self.is_read && self.sender_id != reader_id
    }
}
