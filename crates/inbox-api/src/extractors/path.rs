//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use inbox_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Deserialize)]
struct RawConversationPath {
    conversation_id: String,
}

/// `{conversation_id}` parsed as a Snowflake
#[derive(Debug, Clone, Copy)]
pub struct ConversationIdPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for ConversationIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RawConversationPath>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        raw.conversation_id
            .parse()
            .map(ConversationIdPath)
            .map_err(|_| ApiError::invalid_path("Invalid conversation_id format"))
    }
}
