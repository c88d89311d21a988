//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; bodies with field rules also
//! implement `Validate`.

use inbox_core::{MessageQuery, Snowflake};
use serde::Deserialize;
use validator::Validate;

/// Open (or fetch) the conversation with another user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConversationRequest {
    pub user_id: Snowflake,
}

/// Send a message over REST
///
/// Trimming and the length cap are enforced by the domain; this only rejects
/// a body that is missing altogether.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Message body cannot be empty"))]
    pub body: String,
}

/// `?page=&page_size=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "page_size must be 1-100"))]
    pub page_size: Option<u32>,
}

impl PaginationQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(MessageQuery::DEFAULT_PAGE_SIZE)
    }
}
