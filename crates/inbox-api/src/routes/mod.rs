//! Route definitions
//!
//! REST routes are mounted under /api/v1; health probes live at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{conversations, health, messages, read_state};
use crate::state::AppState;

/// Create the main API router (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(conversation_routes())
        .route("/unread-count", get(read_state::unread_count))
}

/// Conversation routes
fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/conversations/:conversation_id",
            get(conversations::get_conversation),
        )
        .route(
            "/conversations/:conversation_id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route(
            "/conversations/:conversation_id/read",
            post(read_state::mark_conversation_read),
        )
        .route(
            "/conversations/:conversation_id/unread-count",
            get(read_state::conversation_unread_count),
        )
}
