//! Service context - dependency container for services
//!
//! Holds the repositories, the identity provider, the live publisher, the
//! notification dispatcher and the id generator needed by services.

use std::sync::Arc;

use inbox_common::{IdentityProvider, NotificationConfig};
use inbox_core::traits::{
    ConversationRepository, MessageRepository, NotificationDispatcher, UserRepository,
};
use inbox_core::{Snowflake, SnowflakeGenerator};
use inbox_db::PgPool;

use super::error::{ServiceError, ServiceResult};
use super::publisher::{MessagePublisher, NoopPublisher};
use super::sequencer::ConversationSequencer;
use crate::notify::LogNotifier;

/// Tunables for service behavior
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// A conversation idle for at least this long triggers a notification again
    pub dormant_after: chrono::Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            dormant_after: chrono::Duration::hours(48),
        }
    }
}

impl From<&NotificationConfig> for ServiceSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            dormant_after: config.dormant_after,
        }
    }
}

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Database pool, absent with in-memory storage
    pool: Option<PgPool>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,

    // Collaborators
    identity: Arc<dyn IdentityProvider>,
    publisher: Arc<dyn MessagePublisher>,
    notifier: Arc<dyn NotificationDispatcher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    sequencer: Arc<ConversationSequencer>,
    settings: ServiceSettings,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Database Pool ===

    /// Get the PostgreSQL connection pool, if storage is backed by one
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Collaborators ===

    /// Get the identity provider used to turn bearer tokens into user ids
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn publisher(&self) -> &dyn MessagePublisher {
        self.publisher.as_ref()
    }

    /// Shared handle to the dispatcher, for spawned notification tasks
    pub fn notifier(&self) -> Arc<dyn NotificationDispatcher> {
        Arc::clone(&self.notifier)
    }

    pub fn sequencer(&self) -> &ConversationSequencer {
        self.sequencer.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("repositories", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    publisher: Option<Arc<dyn MessagePublisher>>,
    notifier: Option<Arc<dyn NotificationDispatcher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: ServiceSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    /// Use one store for users, conversations and messages
    pub fn repositories<S>(self, store: Arc<S>) -> Self
    where
        S: UserRepository + ConversationRepository + MessageRepository + 'static,
    {
        self.user_repo(store.clone())
            .conversation_repo(store.clone())
            .message_repo(store)
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn MessagePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// Publisher, notifier and id generator fall back to [`NoopPublisher`],
    /// [`LogNotifier`] and worker 0.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository or the identity provider is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            pool: self.pool,
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            conversation_repo: self
                .conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            message_repo: self
                .message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            identity: self
                .identity
                .ok_or_else(|| ServiceError::validation("identity provider is required"))?,
            publisher: self.publisher.unwrap_or_else(|| Arc::new(NoopPublisher)),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            sequencer: Arc::new(ConversationSequencer::new()),
            settings: self.settings,
        })
    }
}
