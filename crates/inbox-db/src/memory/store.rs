//! In-memory repositories
//!
//! One lock guards users, conversations and messages so every operation sees
//! the same invariants the Postgres schema enforces.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use inbox_core::entities::{Conversation, ConversationOverview, Message, User};
use inbox_core::error::DomainError;
use inbox_core::traits::{ConversationRepository, MessageRepository, RepoResult, UserRepository};
use inbox_core::value_objects::{MessageOrder, MessageQuery, Snowflake};

#[derive(Default)]
struct State {
    users: HashMap<Snowflake, User>,
    conversations: HashMap<Snowflake, Conversation>,
    pairs: HashMap<(Snowflake, Snowflake), Snowflake>,
    messages: HashMap<Snowflake, Message>,
    /// Message ids per conversation in insertion order
    timelines: HashMap<Snowflake, Vec<Snowflake>>,
}

impl State {
    /// Messages of one conversation sorted by `(created_at, id)`
    fn timeline(&self, conversation_id: Snowflake) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .timelines
            .get(&conversation_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.messages.get(id))
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        messages
    }

    fn unread_for(&self, conversation_id: Snowflake, reader_id: Snowflake) -> i64 {
        self.timelines
            .get(&conversation_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.messages.get(id))
            .filter(|m| m.is_unread_for(reader_id))
            .count() as i64
    }
}

/// In-memory implementation of the user, conversation and message repositories
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with a database error until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::DatabaseError("storage unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn conversation_count(&self) -> usize {
        self.state.read().conversations.len()
    }

    pub fn message_count(&self) -> usize {
        self.state.read().messages.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.check_available()?;
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        self.check_available()?;
        let mut state = self.state.write();
        if state.users.contains_key(&user.id) {
            return Err(DomainError::ValidationError(format!(
                "user {} already exists",
                user.id
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        self.check_available()?;
        Ok(self.state.read().conversations.get(&id).cloned())
    }

    async fn find_by_participants(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        self.check_available()?;
        let state = self.state.read();
        Ok(state
            .pairs
            .get(&Conversation::key_for(a, b))
            .and_then(|id| state.conversations.get(id))
            .cloned())
    }

    async fn create(&self, conversation: &Conversation) -> RepoResult<()> {
        self.check_available()?;
        if conversation.user_a == conversation.user_b {
            return Err(DomainError::InvalidParticipants);
        }
        let mut state = self.state.write();
        let key = conversation.pair_key();
        if state.pairs.contains_key(&key) {
            return Err(DomainError::ConversationExists);
        }
        state.pairs.insert(key, conversation.id);
        state.conversations.insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn list_for_participant(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<ConversationOverview>> {
        self.check_available()?;
        let state = self.state.read();
        let mut overviews: Vec<ConversationOverview> = state
            .conversations
            .values()
            .filter(|c| c.is_participant(user_id))
            .map(|c| ConversationOverview {
                conversation: c.clone(),
                last_message: state.timeline(c.id).last().map(|m| (*m).clone()),
                unread_count: state.unread_for(c.id, user_id),
            })
            .collect();

        // Conversations with messages first, by last activity; then empty ones by creation
        overviews.sort_by(|x, y| {
            let x_key = x.last_message.as_ref().map(|m| (m.created_at, m.id));
            let y_key = y.last_message.as_ref().map(|m| (m.created_at, m.id));
            y_key
                .is_some()
                .cmp(&x_key.is_some())
                .then_with(|| y_key.cmp(&x_key))
                .then_with(|| y.conversation.created_at.cmp(&x.conversation.created_at))
                .then_with(|| y.conversation.id.cmp(&x.conversation.id))
        });
        Ok(overviews)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        self.check_available()?;
        Ok(self.state.read().messages.get(&id).cloned())
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.check_available()?;
        let mut state = self.state.write();
        let conversation = state
            .conversations
            .get(&message.conversation_id)
            .ok_or(DomainError::ConversationNotFound(message.conversation_id))?;
        if !conversation.is_participant(message.sender_id) {
            return Err(DomainError::NotParticipant);
        }
        if message.body.trim().is_empty() {
            return Err(DomainError::EmptyBody);
        }

        state.messages.insert(message.id, message.clone());
        state
            .timelines
            .entry(message.conversation_id)
            .or_default()
            .push(message.id);
        Ok(())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        self.check_available()?;
        let state = self.state.read();
        let mut timeline = state.timeline(conversation_id);
        if query.order == MessageOrder::Descending {
            timeline.reverse();
        }
        Ok(timeline
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(0))
            .take(usize::try_from(query.limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn find_latest(&self, conversation_id: Snowflake) -> RepoResult<Option<Message>> {
        self.check_available()?;
        let state = self.state.read();
        Ok(state.timeline(conversation_id).last().map(|m| (*m).clone()))
    }

    async fn mark_all_read(
        &self,
        conversation_id: Snowflake,
        reader_id: Snowflake,
    ) -> RepoResult<u64> {
        self.check_available()?;
        let mut state = self.state.write();
        let State {
            messages,
            timelines,
            ..
        } = &mut *state;

        let mut changed = 0;
        for id in timelines.get(&conversation_id).into_iter().flatten() {
            if let Some(message) = messages.get_mut(id) {
                if message.is_unread_for(reader_id) {
                    message.is_read = true;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn mark_read(&self, message_id: Snowflake, reader_id: Snowflake) -> RepoResult<bool> {
        self.check_available()?;
        let mut state = self.state.write();
        let State {
            messages,
            conversations,
            ..
        } = &mut *state;

        let Some(message) = messages.get_mut(&message_id) else {
            return Ok(false);
        };
        let participant = conversations
            .get(&message.conversation_id)
            .is_some_and(|c| c.is_participant(reader_id));
        if !participant || !message.is_unread_for(reader_id) {
            return Ok(false);
        }
        message.is_read = true;
        Ok(true)
    }

    async fn count_unread(&self, user_id: Snowflake) -> RepoResult<i64> {
        self.check_available()?;
        let state = self.state.read();
        Ok(state
            .conversations
            .values()
            .filter(|c| c.is_participant(user_id))
            .map(|c| state.unread_for(c.id, user_id))
            .sum())
    }

    async fn count_unread_in_conversation(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<i64> {
        self.check_available()?;
        Ok(self.state.read().unread_for(conversation_id, user_id))
    }
}
