//! Ports implemented by the infrastructure layers

mod notifications;
mod repositories;

pub use notifications::NotificationDispatcher;
pub use repositories::{ConversationRepository, MessageRepository, RepoResult, UserRepository};
