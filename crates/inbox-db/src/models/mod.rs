//! Database models - SQLx-compatible structs for PostgreSQL tables

mod conversation;
mod message;
mod user;

pub use conversation::{ConversationModel, ConversationOverviewModel};
pub use message::MessageModel;
pub use user::UserModel;
