//! Message handlers

use axum::{extract::State, Json};
use inbox_service::dto::{MessagePage, MessageResponse, SendMessageRequest};
use inbox_service::{ConversationService, MessageService};

use crate::extractors::{AuthUser, ConversationIdPath, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Paged history, newest first
///
/// GET /conversations/{conversation_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
    pagination: Pagination,
) -> ApiResult<Json<MessagePage>> {
    let service = ConversationService::new(state.service_context());
    let page = service
        .history(
            conversation_id,
            auth.user_id,
            pagination.page,
            pagination.page_size,
        )
        .await?;
    Ok(Json(page))
}

/// Send a message; live sessions in the conversation receive it too
///
/// POST /conversations/{conversation_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ConversationIdPath(conversation_id): ConversationIdPath,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service
        .send_message(conversation_id, auth.user_id, &request.body)
        .await?;
    Ok(Created(Json(response)))
}
