//! Shared fixtures for service tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use inbox_common::JwtService;
use inbox_core::entities::{Conversation, NewMessageNotification, User};
use inbox_core::traits::{NotificationDispatcher, UserRepository};
use inbox_core::{DomainError, Snowflake, SnowflakeGenerator};
use inbox_db::MemoryStore;

use super::{ConversationService, MessagePublisher, ServiceContext};
use crate::dto::MessageResponse;

pub const ALICE: Snowflake = Snowflake::new(1);
pub const BOB: Snowflake = Snowflake::new(2);
/// Has notifications turned off
pub const CAROL: Snowflake = Snowflake::new(3);

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(Snowflake, Arc<MessageResponse>)>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(Snowflake, Arc<MessageResponse>)> {
        self.published.lock().unwrap().clone()
    }
}

impl MessagePublisher for RecordingPublisher {
    fn publish(&self, conversation_id: Snowflake, message: Arc<MessageResponse>) -> usize {
        self.published.lock().unwrap().push((conversation_id, message));
        1
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NewMessageNotification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<NewMessageNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Dispatch is spawned, so poll until `count` notifications arrived
    pub async fn wait_for(&self, count: usize) -> Vec<NewMessageNotification> {
        for _ in 0..100 {
            let sent = self.sent();
            if sent.len() >= count {
                // Give stragglers a chance to show up
                tokio::time::sleep(Duration::from_millis(10)).await;
                return self.sent();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn dispatch(&self, notification: NewMessageNotification) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct Fixture {
    pub ctx: ServiceContext,
    pub store: Arc<MemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Fixture {
    pub async fn conversation(&self, initiator: Snowflake, recipient: Snowflake) -> Conversation {
        ConversationService::new(&self.ctx)
            .find_or_create(initiator, recipient)
            .await
            .unwrap()
            .0
    }
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    for user in [
        User::new(ALICE, "Alice", "alice@example.com"),
        User::new(BOB, "Bob", "bob@example.com"),
        User::new(CAROL, "Carol", "carol@example.com").without_notifications(),
    ] {
        UserRepository::create(store.as_ref(), &user).await.unwrap();
    }

    let publisher = Arc::new(RecordingPublisher::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = ServiceContext::builder()
        .repositories(Arc::clone(&store))
        .identity(Arc::new(JwtService::new("test-secret", 300)))
        .publisher(publisher.clone())
        .notifier(notifier.clone())
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(7)))
        .build()
        .unwrap();

    Fixture {
        ctx,
        store,
        publisher,
        notifier,
    }
}
