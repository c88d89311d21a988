//! # inbox-service
//!
//! Application layer: the single write path for messages, conversation
//! lookup and listing, read-state tracking, notification dispatch and the
//! DTOs returned to clients.

pub mod dto;
pub mod notify;
pub mod services;

pub use notify::{LogNotifier, NotificationPolicy, WebhookNotifier};
pub use services::{
    ConversationSequencer, ConversationService, MessagePublisher, MessageService, NoopPublisher,
    ReadStateService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    ServiceSettings,
};
