//! Conversation handlers
//!
//! Inbox listing, create-or-fetch and the conversation detail view.

use axum::{extract::State, http::StatusCode, Json};
use inbox_service::dto::{
    ConversationDetail, ConversationSummary, CreateConversationRequest, OpenConversationResponse,
};
use inbox_service::ConversationService;

use crate::extractors::{AuthUser, ConversationIdPath, Pagination, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// List the caller's conversations, most recently active first
///
/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let service = ConversationService::new(state.service_context());
    let conversations = service.list_for_participant(auth.user_id).await?;
    Ok(Json(conversations))
}

/// Open the conversation with another user
///
/// POST /conversations
///
/// 201 when the conversation was created by this call, 200 when it already existed.
pub async fn create_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateConversationRequest>,
) -> ApiResult<(StatusCode, Json<OpenConversationResponse>)> {
    let service = ConversationService::new(state.service_context());
    let response = service.open(auth.user_id, request.user_id).await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

/// Conversation detail with messages oldest first; marks the conversation read
///
/// GET /conversations/{conversation_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
    pagination: Pagination,
) -> ApiResult<Json<ConversationDetail>> {
    let service = ConversationService::new(state.service_context());
    let detail = service
        .detail(
            conversation_id,
            auth.user_id,
            pagination.page,
            pagination.page_size,
        )
        .await?;
    Ok(Json(detail))
}
