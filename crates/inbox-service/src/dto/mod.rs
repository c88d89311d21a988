//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API and gateway outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{CreateConversationRequest, PaginationQuery, SendMessageRequest};

pub use responses::{
    ConversationDetail, ConversationSummary, HealthChecks, HealthResponse, LastMessagePreview,
    MarkReadResponse, MessagePage, MessageResponse, OpenConversationResponse, PageMeta,
    ReadinessResponse, UnreadCountResponse, UserSummary,
};
