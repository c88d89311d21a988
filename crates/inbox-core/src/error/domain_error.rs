//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Message body cannot be empty")]
    EmptyBody,

    #[error("Message body exceeds {max} characters")]
    ContentTooLong { max: usize },

    #[error("Cannot create conversation with yourself")]
    InvalidParticipants,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("You are not part of this conversation")]
    NotParticipant,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Conversation already exists for this pair")]
    ConversationExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyBody => "EMPTY_BODY",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidParticipants => "INVALID_PARTICIPANTS",

            Self::NotParticipant => "NOT_PARTICIPANT",

            Self::ConversationExists => "CONVERSATION_EXISTS",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::ConversationNotFound(_) | Self::MessageNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyBody
                | Self::ContentTooLong { .. }
                | Self::InvalidParticipants
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotParticipant)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConversationExists)
    }
}
