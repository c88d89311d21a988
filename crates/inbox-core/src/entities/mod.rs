//! Domain entities - core business objects

mod conversation;
mod message;
mod notification;
mod user;

pub use conversation::{Conversation, ConversationOverview};
pub use message::Message;
pub use notification::NewMessageNotification;
pub use user::User;
