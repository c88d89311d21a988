//! Read state handlers

use axum::{extract::State, Json};
use inbox_service::dto::{MarkReadResponse, UnreadCountResponse};
use inbox_service::ReadStateService;

use crate::extractors::{AuthUser, ConversationIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /conversations/{conversation_id}/read
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
) -> ApiResult<Json<MarkReadResponse>> {
    let marked_read = ReadStateService::new(state.service_context())
        .mark_all_read(conversation_id, auth.user_id)
        .await?;
    Ok(Json(MarkReadResponse { marked_read }))
}

/// Unread messages addressed to the caller in one conversation
///
/// GET /conversations/{conversation_id}/unread-count
pub async fn conversation_unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = ReadStateService::new(state.service_context())
        .unread_count_for_conversation(conversation_id, auth.user_id)
        .await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// Unread messages addressed to the caller across all conversations
///
/// GET /unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = ReadStateService::new(state.service_context())
        .unread_count(auth.user_id)
        .await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}
