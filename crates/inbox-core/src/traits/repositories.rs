//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{Conversation, ConversationOverview, Message, User};
use crate::error::DomainError;
use crate::value_objects::{MessageQuery, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Directory
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Register a directory entry
    async fn create(&self, user: &User) -> RepoResult<()>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Find the conversation between two users, in either order
    async fn find_by_participants(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<Conversation>>;

    /// Insert a conversation.
    ///
    /// Fails with [`DomainError::ConversationExists`] when a conversation for
    /// the same unordered pair is already stored.
    async fn create(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Conversations `user_id` takes part in, most recently active first.
    /// Conversations without messages come last, newest first.
    async fn list_for_participant(&self, user_id: Snowflake)
        -> RepoResult<Vec<ConversationOverview>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Insert a message.
    ///
    /// The participant check is part of the write: fails with
    /// [`DomainError::ConversationNotFound`] or [`DomainError::NotParticipant`]
    /// without storing anything.
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// List messages in a conversation ordered by `(created_at, id)`
    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>>;

    /// Most recent message of a conversation
    async fn find_latest(&self, conversation_id: Snowflake) -> RepoResult<Option<Message>>;

    /// Flip every unread message not sent by `reader_id`; returns rows changed
    async fn mark_all_read(&self, conversation_id: Snowflake, reader_id: Snowflake)
        -> RepoResult<u64>;

    /// Flip one message if it is unread, was not sent by `reader_id` and
    /// `reader_id` participates in its conversation; returns whether it changed
    async fn mark_read(&self, message_id: Snowflake, reader_id: Snowflake) -> RepoResult<bool>;

    /// Unread messages addressed to `user_id` across all conversations
    async fn count_unread(&self, user_id: Snowflake) -> RepoResult<i64>;

    /// Unread messages addressed to `user_id` in one conversation
    async fn count_unread_in_conversation(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<i64>;
}
