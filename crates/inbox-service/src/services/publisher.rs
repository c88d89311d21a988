//! Live fan-out port
//!
//! The message write path hands every stored message to a
//! [`MessagePublisher`]. The gateway's broadcaster implements it by enqueueing
//! onto the outbound queue of every session in the conversation's room.

use std::sync::Arc;

use inbox_core::Snowflake;

use crate::dto::MessageResponse;

pub trait MessagePublisher: Send + Sync {
    /// Enqueue `message` for every live session of `conversation_id`.
    ///
    /// Must not block on any single session. Returns the number of sessions
    /// the message was enqueued for.
    fn publish(&self, conversation_id: Snowflake, message: Arc<MessageResponse>) -> usize;

    /// Number of live sessions across all rooms
    fn live_sessions(&self) -> usize {
        0
    }
}

/// Publisher used when no gateway is mounted
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl MessagePublisher for NoopPublisher {
    fn publish(&self, _conversation_id: Snowflake, _message: Arc<MessageResponse>) -> usize {
        0
    }
}
