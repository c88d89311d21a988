//! REST API integration tests
//!
//! Each test spawns its own server over in-memory storage.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, parse_id, CreateConversation, SendMessage, TestServer,
};
use inbox_core::Snowflake;
use reqwest::StatusCode;
use serde_json::Value;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready_without_database() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "not_configured");
    assert_eq!(body["checks"]["live_sessions"], 0);
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/v1/conversations").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .get_auth("/api/v1/conversations", "not-a-jwt")
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_token_for_unknown_user_is_unauthorized() {
    let server = TestServer::start().await.unwrap();
    let token = server.token_for(Snowflake::new(424_242)).unwrap();
    let response = server.get_auth("/api/v1/unread-count", &token).await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Conversation Tests
// ============================================================================

#[tokio::test]
async fn test_create_or_fetch_conversation() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/conversations",
            &alice.token,
            &CreateConversation { user_id: bob.id },
        )
        .await
        .unwrap();
    let created: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created["created"], true);
    assert_eq!(created["conversation"]["other_user"]["name"], "Bob");
    assert!(created["conversation"]["last_message"].is_null());
    let id = parse_id(&created["conversation"]["id"]).unwrap();

    // Same pair again, from either side, returns the same conversation
    let response = server
        .post_auth(
            "/api/v1/conversations",
            &bob.token,
            &CreateConversation { user_id: alice.id },
        )
        .await
        .unwrap();
    let fetched: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched["created"], false);
    assert_eq!(parse_id(&fetched["conversation"]["id"]).unwrap(), id);
    assert_eq!(fetched["conversation"]["other_user"]["name"], "Alice");

    assert_eq!(server.store.conversation_count(), 1);
}

#[tokio::test]
async fn test_conversation_with_self_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/conversations",
            &alice.token,
            &CreateConversation { user_id: alice.id },
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PARTICIPANTS");
}

#[tokio::test]
async fn test_conversation_with_unknown_user_is_not_found() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/conversations",
            &alice.token,
            &CreateConversation {
                user_id: Snowflake::new(999_999),
            },
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(server.store.conversation_count(), 0);
}

#[tokio::test]
async fn test_list_orders_by_latest_message() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let carol = server.create_user("Carol").await.unwrap();
    let dave = server.create_user("Dave").await.unwrap();

    let with_bob = server.open_conversation(&alice, &bob).await.unwrap();
    let with_carol = server.open_conversation(&alice, &carol).await.unwrap();
    let with_dave = server.open_conversation(&alice, &dave).await.unwrap();

    server.send_rest(&alice, with_carol, "first").await.unwrap();
    server.send_rest(&bob, with_bob, "second").await.unwrap();

    let response = server
        .get_auth("/api/v1/conversations", &alice.token)
        .await
        .unwrap();
    let list: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    let ids: Vec<Snowflake> = list.iter().map(|c| parse_id(&c["id"]).unwrap()).collect();
    assert_eq!(ids, vec![with_bob, with_carol, with_dave]);

    assert_eq!(list[0]["last_message"]["body"], "second");
    assert_eq!(list[0]["unread_count"], 1);
    assert_eq!(list[1]["unread_count"], 0);
    assert!(list[2]["last_message"].is_null());
}

#[tokio::test]
async fn test_detail_returns_ascending_messages_and_marks_read() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    for body in ["one", "two", "three"] {
        server.send_rest(&alice, conversation, body).await.unwrap();
    }
    assert_eq!(server.unread_count(&bob).await.unwrap(), 3);

    let response = server
        .get_auth(&format!("/api/v1/conversations/{conversation}"), &bob.token)
        .await
        .unwrap();
    let detail: Value = assert_json(response, StatusCode::OK).await.unwrap();
    let bodies: Vec<&str> = detail["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);
    assert_eq!(detail["other_user"]["name"], "Alice");
    assert_eq!(detail["pagination"]["has_more"], false);

    assert_eq!(server.unread_count(&bob).await.unwrap(), 0);
}

#[tokio::test]
async fn test_outsider_is_forbidden() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let carol = server.create_user("Carol").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let paths = [
        format!("/api/v1/conversations/{conversation}"),
        format!("/api/v1/conversations/{conversation}/messages"),
        format!("/api/v1/conversations/{conversation}/unread-count"),
    ];
    for path in &paths {
        let response = server.get_auth(path, &carol.token).await.unwrap();
        let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
        assert_eq!(code, "NOT_PARTICIPANT");
    }

    let response = server
        .post_auth(
            &format!("/api/v1/conversations/{conversation}/messages"),
            &carol.token,
            &SendMessage::new("let me in"),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(server.store.message_count(), 0);
}

#[tokio::test]
async fn test_unknown_conversation_is_not_found() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();

    let response = server
        .get_auth("/api/v1/conversations/123456", &alice.token)
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get_auth("/api/v1/conversations/not-an-id", &alice.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_send_message_returns_stored_message() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let message = server
        .send_rest(&alice, conversation, "  hello bob  ")
        .await
        .unwrap();
    assert_eq!(message["body"], "hello bob");
    assert_eq!(message["sender_name"], "Alice");
    assert_eq!(message["is_read"], false);
    assert_eq!(parse_id(&message["sender_id"]).unwrap(), alice.id);
    assert_eq!(parse_id(&message["conversation_id"]).unwrap(), conversation);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();
    let path = format!("/api/v1/conversations/{conversation}/messages");

    for body in ["", "   "] {
        let response = server
            .post_auth(&path, &alice.token, &SendMessage::new(body))
            .await
            .unwrap();
        assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    }

    let response = server
        .post_auth(&path, &alice.token, &SendMessage::new("x".repeat(4001)))
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(server.store.message_count(), 0);
}

#[tokio::test]
async fn test_history_is_newest_first_and_paged() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    for body in ["one", "two", "three"] {
        server.send_rest(&alice, conversation, body).await.unwrap();
    }

    let page = |n: u32| {
        let server = &server;
        let token = bob.token.clone();
        async move {
            let response = server
                .get_auth(
                    &format!("/api/v1/conversations/{conversation}/messages?page={n}&page_size=2"),
                    &token,
                )
                .await
                .unwrap();
            assert_json::<Value>(response, StatusCode::OK).await.unwrap()
        }
    };

    let first = page(1).await;
    let bodies: Vec<&str> = first["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["three", "two"]);
    assert_eq!(first["pagination"]["has_more"], true);

    let second = page(2).await;
    assert_eq!(second["messages"][0]["body"], "one");
    assert_eq!(second["pagination"]["has_more"], false);

    // Reading history leaves read state alone
    assert_eq!(server.unread_count(&bob).await.unwrap(), 3);
}

#[tokio::test]
async fn test_page_size_out_of_range_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{conversation}/messages?page_size=101"),
            &alice.token,
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");
}

// ============================================================================
// Read State Tests
// ============================================================================

#[tokio::test]
async fn test_mark_read_and_unread_counts() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let carol = server.create_user("Carol").await.unwrap();
    let with_alice = server.open_conversation(&bob, &alice).await.unwrap();
    let with_carol = server.open_conversation(&bob, &carol).await.unwrap();

    server.send_rest(&alice, with_alice, "a1").await.unwrap();
    server.send_rest(&alice, with_alice, "a2").await.unwrap();
    server.send_rest(&carol, with_carol, "c1").await.unwrap();
    // Own messages never count as unread
    server.send_rest(&bob, with_alice, "b1").await.unwrap();

    assert_eq!(server.unread_count(&bob).await.unwrap(), 3);
    assert_eq!(server.unread_count(&alice).await.unwrap(), 1);

    let response = server
        .get_auth(
            &format!("/api/v1/conversations/{with_alice}/unread-count"),
            &bob.token,
        )
        .await
        .unwrap();
    let scoped: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(scoped["unread_count"], 2);

    let response = server
        .post_auth_empty(&format!("/api/v1/conversations/{with_alice}/read"), &bob.token)
        .await
        .unwrap();
    let marked: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(marked["marked_read"], 2);

    // Idempotent
    let response = server
        .post_auth_empty(&format!("/api/v1/conversations/{with_alice}/read"), &bob.token)
        .await
        .unwrap();
    let marked: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(marked["marked_read"], 0);

    assert_eq!(server.unread_count(&bob).await.unwrap(), 1);
}
