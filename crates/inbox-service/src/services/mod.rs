//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and orchestrate repositories, the
//! live publisher and the notification dispatcher.

pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod publisher;
pub mod read_state;
pub mod sequencer;

pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use publisher::{MessagePublisher, NoopPublisher};
pub use read_state::ReadStateService;
pub use sequencer::ConversationSequencer;

#[cfg(test)]
pub(crate) mod test_support;
