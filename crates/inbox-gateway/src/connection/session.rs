//! A single live connection bound to one participant and one room

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use inbox_core::Snowflake;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use crate::protocol::{CloseCode, OutboundFrame};

pub type SessionId = Uuid;

/// Why a frame could not be enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// The queue is at capacity
    Full,
    /// The send loop is gone
    Closed,
}

/// Registry-side handle of a connection
///
/// Holds the producing end of the session's bounded outbound queue. The
/// connection task owns the consuming end and writes frames to the socket.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    participant: Snowflake,
    room: Snowflake,
    sender: mpsc::Sender<OutboundFrame>,
    closed: AtomicBool,
    close_code: OnceLock<CloseCode>,
    shutdown: Notify,
    connected_at: Instant,
}

impl Session {
    /// Create a session and the receiving end of its outbound queue
    pub fn new(
        participant: Snowflake,
        room: Snowflake,
        buffer: usize,
    ) -> (Arc<Self>, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            participant,
            room,
            sender,
            closed: AtomicBool::new(false),
            close_code: OnceLock::new(),
            shutdown: Notify::new(),
            connected_at: Instant::now(),
        });
        (session, receiver)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn participant(&self) -> Snowflake {
        self.participant
    }

    pub fn room(&self) -> Snowflake {
        self.room
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Enqueue without waiting
    pub fn try_enqueue(&self, frame: OutboundFrame) -> Result<(), EnqueueError> {
        if self.is_closed() {
            return Err(EnqueueError::Closed);
        }
        self.sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Enqueue, waiting for queue space. Used for frames addressed to this
    /// session only, never for broadcasts.
    pub async fn enqueue(&self, frame: OutboundFrame) -> Result<(), EnqueueError> {
        if self.is_closed() {
            return Err(EnqueueError::Closed);
        }
        self.sender.send(frame).await.map_err(|_| EnqueueError::Closed)
    }

    /// Ask the connection task to close with `code`. The first code wins.
    pub fn close(&self, code: CloseCode) {
        let _ = self.close_code.set(code);
        if !self.closed.swap(true, Ordering::AcqRel) {
            // notify_one stores a permit if the connection task is not waiting yet
            self.shutdown.notify_one();
        }
    }

    /// Resolves once [`Self::close`] was called, with the requested code
    pub async fn closed(&self) -> CloseCode {
        if !self.closed.load(Ordering::Acquire) {
            self.shutdown.notified().await;
        }
        self.close_code().unwrap_or(CloseCode::Normal)
    }

    pub fn close_code(&self) -> Option<CloseCode> {
        self.close_code.get().copied()
    }

    /// Closed explicitly, or the consuming end of the queue was dropped
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_closed()
    }
}
