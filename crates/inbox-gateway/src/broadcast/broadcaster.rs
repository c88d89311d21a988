//! Broadcaster
//!
//! Implements the service layer's `MessagePublisher` over the session
//! registry. Publishing never waits on a session: a full queue evicts that
//! session, a closed queue removes it, and everyone else still gets the frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use inbox_core::Snowflake;
use inbox_service::dto::MessageResponse;
use inbox_service::MessagePublisher;

use crate::connection::{EnqueueError, SessionRegistry};
use crate::protocol::{CloseCode, OutboundFrame};

pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
    /// Sessions evicted for falling behind
    evicted: AtomicU64,
}

impl Broadcaster {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            evicted: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn evicted_count(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Enqueue `frame` for every session in `room`; returns how many accepted it
    pub fn broadcast(&self, room: Snowflake, frame: &OutboundFrame) -> usize {
        let mut delivered = 0;

        for session in self.registry.sessions_in_room(room) {
            match session.try_enqueue(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(EnqueueError::Full) => {
                    tracing::warn!(
                        room = %room,
                        session_id = %session.id(),
                        participant = %session.participant(),
                        "Outbound queue full, evicting session"
                    );
                    self.evicted.fetch_add(1, Ordering::Relaxed);
                    session.close(CloseCode::SlowConsumer);
                    self.registry.leave(room, session.id());
                }
                Err(EnqueueError::Closed) => {
                    tracing::debug!(
                        room = %room,
                        session_id = %session.id(),
                        "Dropping closed session"
                    );
                    self.registry.leave(room, session.id());
                }
            }
        }

        tracing::trace!(room = %room, delivered = delivered, "Frame broadcast to room");
        delivered
    }
}

impl MessagePublisher for Broadcaster {
    fn publish(&self, conversation_id: Snowflake, message: Arc<MessageResponse>) -> usize {
        self.broadcast(conversation_id, &OutboundFrame::Message(message))
    }

    fn live_sessions(&self) -> usize {
        self.registry.session_count()
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("registry", &self.registry)
            .field("evicted", &self.evicted_count())
            .finish()
    }
}
