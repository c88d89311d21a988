//! Session registry
//!
//! Maps each conversation room to its live sessions using DashMap for
//! thread-safe access. All access goes through `join`, `leave` and
//! `sessions_in_room`; nothing outside this type touches the map.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use inbox_core::Snowflake;

use super::session::{Session, SessionId};

/// Tracks which sessions are live in which room
#[derive(Default)]
pub struct SessionRegistry {
    rooms: DashMap<Snowflake, HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Add a session to its room. Joining twice is a no-op.
    pub fn join(&self, session: Arc<Session>) {
        let room = session.room();
        let session_id = session.id();
        self.rooms.entry(room).or_default().insert(session_id, session);

        tracing::debug!(room = %room, session_id = %session_id, "Session joined room");
    }

    /// Remove a session from a room. Idempotent; returns whether it was present.
    ///
    /// Empty rooms are dropped in the same step using `remove_if`, so a
    /// concurrent join cannot land in a room that is being removed.
    pub fn leave(&self, room: Snowflake, session_id: SessionId) -> bool {
        let removed = self
            .rooms
            .get_mut(&room)
            .is_some_and(|mut sessions| sessions.remove(&session_id).is_some());
        self.rooms.remove_if(&room, |_, sessions| sessions.is_empty());

        if removed {
            tracing::debug!(room = %room, session_id = %session_id, "Session left room");
        }
        removed
    }

    /// Snapshot of the sessions currently in `room`
    ///
    /// The snapshot is detached from the registry: joins and leaves that
    /// happen while it is being iterated do not affect it.
    pub fn sessions_in_room(&self, room: Snowflake) -> Vec<Arc<Session>> {
        self.rooms
            .get(&room)
            .map(|sessions| sessions.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove every session whose connection has gone away
    pub fn prune_closed(&self) -> usize {
        let closed: Vec<(Snowflake, SessionId)> = self
            .rooms
            .iter()
            .flat_map(|room| {
                room.value()
                    .values()
                    .filter(|s| s.is_closed())
                    .map(|s| (s.room(), s.id()))
                    .collect::<Vec<_>>()
            })
            .collect();

        let count = closed
            .into_iter()
            .filter(|(room, session_id)| self.leave(*room, *session_id))
            .count();

        if count > 0 {
            tracing::info!(count = count, "Cleaned up closed sessions");
        }
        count
    }

    /// Total number of live sessions
    pub fn session_count(&self) -> usize {
        self.rooms.iter().map(|room| room.value().len()).sum()
    }

    /// Number of rooms with at least one session
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, room: Snowflake, session_id: SessionId) -> bool {
        self.rooms
            .get(&room)
            .is_some_and(|sessions| sessions.contains_key(&session_id))
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("rooms", &self.room_count())
            .field("sessions", &self.session_count())
            .finish()
    }
}
