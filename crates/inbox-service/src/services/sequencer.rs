//! Per-conversation write ordering
//!
//! Appending a message and publishing it happen under one lock per
//! conversation, so the order in which messages are stored is the order in
//! which every session receives them. Different conversations never contend.

use std::sync::Arc;

use dashmap::DashMap;
use inbox_core::Snowflake;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct ConversationSequencer {
    locks: DashMap<Snowflake, Arc<Mutex<()>>>,
}

impl ConversationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `conversation_id`
    pub async fn acquire(&self, conversation_id: Snowflake) -> OwnedMutexGuard<()> {
        // Clone out of the map before awaiting so no shard lock is held across the await
        let lock = Arc::clone(self.locks.entry(conversation_id).or_default().value());
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits on; returns how many were removed
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.locks.len())
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
