//! # inbox-core
//!
//! Domain layer for direct messaging: conversations between exactly two users,
//! the messages exchanged inside them, and the ports the infrastructure has to
//! provide (repositories, user directory, notification dispatch).
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Conversation, ConversationOverview, Message, NewMessageNotification, User};
pub use error::DomainError;
pub use traits::{
    ConversationRepository, MessageRepository, NotificationDispatcher, RepoResult, UserRepository,
};
pub use value_objects::{
    MessageOrder, MessageQuery, Snowflake, SnowflakeGenerator, SnowflakeParseError,
};
