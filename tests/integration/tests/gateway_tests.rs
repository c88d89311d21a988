//! Gateway integration tests
//!
//! Real WebSocket clients against a spawned server.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use integration_tests::{message_frame, parse_id, test_config, TestServer, WsClient};
use inbox_core::Snowflake;

const UNAUTHENTICATED: u16 = 4001;
const FORBIDDEN: u16 = 4003;
const SESSION_TIMEOUT: u16 = 4009;

#[tokio::test]
async fn test_message_is_delivered_live_to_both_participants() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut alice_ws = server.connect(&alice, conversation).await.unwrap();
    let mut bob_ws = server.connect(&bob, conversation).await.unwrap();

    alice_ws.send_json(&message_frame("  hi bob ")).await.unwrap();

    let received = bob_ws.next_json().await.unwrap();
    assert_eq!(received["message"]["body"], "hi bob");
    assert_eq!(received["message"]["sender_name"], "Alice");
    assert_eq!(parse_id(&received["message"]["sender_id"]).unwrap(), alice.id);
    assert_eq!(
        parse_id(&received["message"]["conversation_id"]).unwrap(),
        conversation
    );

    // The sender's own session gets the same broadcast
    let echoed = alice_ws.next_json().await.unwrap();
    assert_eq!(echoed["message"]["id"], received["message"]["id"]);

    // Delivery to the recipient's live session counts as read
    assert!(server.wait_for_unread(&bob, 0).await);
    assert_eq!(server.store.message_count(), 1);
}

#[tokio::test]
async fn test_messages_arrive_in_send_order() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut alice_ws = server.connect(&alice, conversation).await.unwrap();
    let mut bob_ws = server.connect(&bob, conversation).await.unwrap();

    for i in 0..10 {
        alice_ws
            .send_json(&message_frame(&format!("m{i}")))
            .await
            .unwrap();
    }

    for i in 0..10 {
        let frame = bob_ws.next_json().await.unwrap();
        assert_eq!(frame["message"]["body"], format!("m{i}"));
    }
}

#[tokio::test]
async fn test_rest_message_is_broadcast_live() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut bob_ws = server.connect(&bob, conversation).await.unwrap();

    let sent = server.send_rest(&alice, conversation, "over rest").await.unwrap();
    let frame = bob_ws.next_json().await.unwrap();
    assert_eq!(frame["message"]["id"], sent["id"]);
    assert_eq!(frame["message"]["body"], "over rest");
}

#[tokio::test]
async fn test_connect_marks_conversation_read() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    server.send_rest(&alice, conversation, "while you were away").await.unwrap();
    server.send_rest(&alice, conversation, "still away?").await.unwrap();
    assert_eq!(server.unread_count(&bob).await.unwrap(), 2);

    let _bob_ws = server.connect(&bob, conversation).await.unwrap();
    assert!(server.wait_for_unread(&bob, 0).await);

    // Alice's own messages were never unread for her
    assert_eq!(server.unread_count(&alice).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_or_invalid_token_closes_unauthenticated() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap().to_string();

    let mut no_token = WsClient::connect(&server.ws_url(&conversation, None)).await.unwrap();
    assert_eq!(no_token.expect_close().await.unwrap(), UNAUTHENTICATED);

    let mut bad_token = WsClient::connect(&server.ws_url(&conversation, Some("garbage")))
        .await
        .unwrap();
    assert_eq!(bad_token.expect_close().await.unwrap(), UNAUTHENTICATED);

    let stranger = server.token_for(Snowflake::new(77)).unwrap();
    let mut unknown_user = WsClient::connect(&server.ws_url(&conversation, Some(&stranger)))
        .await
        .unwrap();
    assert_eq!(unknown_user.expect_close().await.unwrap(), UNAUTHENTICATED);

    assert_eq!(server.registry.session_count(), 0);
}

#[tokio::test]
async fn test_outsider_closes_forbidden() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let carol = server.create_user("Carol").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut outsider = WsClient::connect(&server.ws_url(&conversation.to_string(), Some(&carol.token)))
        .await
        .unwrap();
    assert_eq!(outsider.expect_close().await.unwrap(), FORBIDDEN);

    // A room that does not exist looks the same as one you may not enter
    let mut missing = WsClient::connect(&server.ws_url("987654321", Some(&carol.token)))
        .await
        .unwrap();
    assert_eq!(missing.expect_close().await.unwrap(), FORBIDDEN);

    let mut malformed = WsClient::connect(&server.ws_url("not-a-room", Some(&carol.token)))
        .await
        .unwrap();
    assert_eq!(malformed.expect_close().await.unwrap(), FORBIDDEN);

    assert_eq!(server.registry.session_count(), 0);
}

#[tokio::test]
async fn test_bad_frames_get_error_without_disconnect() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut alice_ws = server.connect(&alice, conversation).await.unwrap();
    let mut bob_ws = server.connect(&bob, conversation).await.unwrap();

    alice_ws.send_text("this is not json").await.unwrap();
    let error = alice_ws.next_json().await.unwrap();
    assert_eq!(error["error"], "Invalid JSON format");

    alice_ws.send_json(&message_frame("   ")).await.unwrap();
    let error = alice_ws.next_json().await.unwrap();
    assert_eq!(error["error"], "Message body cannot be empty");

    alice_ws.send_json(&serde_json::json!({})).await.unwrap();
    let error = alice_ws.next_json().await.unwrap();
    assert_eq!(error["error"], "Message body cannot be empty");

    // Errors go to the offending session only
    bob_ws.expect_silence(Duration::from_millis(200)).await.unwrap();
    assert_eq!(server.store.message_count(), 0);

    // Still connected
    alice_ws.send_json(&message_frame("recovered")).await.unwrap();
    let frame = bob_ws.next_json().await.unwrap();
    assert_eq!(frame["message"]["body"], "recovered");
}

#[tokio::test]
async fn test_disconnect_leaves_room() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let alice_ws = server.connect(&alice, conversation).await.unwrap();
    let mut bob_ws = server.connect(&bob, conversation).await.unwrap();
    assert_eq!(server.registry.sessions_in_room(conversation).len(), 2);

    alice_ws.close().await.unwrap();
    assert!(server.wait_for_room_size(conversation, 1).await);

    // Bob keeps receiving after Alice left
    server.send_rest(&alice, conversation, "from afar").await.unwrap();
    let frame = bob_ws.next_json().await.unwrap();
    assert_eq!(frame["message"]["body"], "from afar");

    // Bob's message stays unread for Alice until she reconnects
    server.send_rest(&bob, conversation, "are you there?").await.unwrap();
    let _ = bob_ws.next_json().await.unwrap();
    assert_eq!(server.unread_count(&alice).await.unwrap(), 1);
}

#[tokio::test]
async fn test_storage_failure_reports_error_and_keeps_connection() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut alice_ws = server.connect(&alice, conversation).await.unwrap();
    let mut bob_ws = server.connect(&bob, conversation).await.unwrap();

    server.store.set_unavailable(true);
    alice_ws.send_json(&message_frame("lost?")).await.unwrap();
    let error = alice_ws.next_json().await.unwrap();
    assert_eq!(error["error"], "Failed to send message");
    bob_ws.expect_silence(Duration::from_millis(200)).await.unwrap();

    server.store.set_unavailable(false);
    assert_eq!(server.store.message_count(), 0);

    alice_ws.send_json(&message_frame("retry")).await.unwrap();
    let frame = bob_ws.next_json().await.unwrap();
    assert_eq!(frame["message"]["body"], "retry");
    assert_eq!(server.store.message_count(), 1);
}

#[tokio::test]
async fn test_idle_session_closes_with_timeout() {
    let mut config = test_config();
    config.gateway.idle_timeout = Duration::from_millis(300);
    config.gateway.ping_interval = Duration::from_secs(60);
    let server = TestServer::start_with_config(config).await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut alice_ws = server.connect(&alice, conversation).await.unwrap();
    assert_eq!(alice_ws.expect_close().await.unwrap(), SESSION_TIMEOUT);
    assert!(server.wait_for_room_size(conversation, 0).await);
}

#[tokio::test]
async fn test_every_device_of_a_participant_receives_messages() {
    let server = TestServer::start().await.unwrap();
    let alice = server.create_user("Alice").await.unwrap();
    let bob = server.create_user("Bob").await.unwrap();
    let conversation = server.open_conversation(&alice, &bob).await.unwrap();

    let mut alice_ws = server.connect(&alice, conversation).await.unwrap();
    let mut bob_phone = server.connect(&bob, conversation).await.unwrap();
    let mut bob_laptop = server.connect(&bob, conversation).await.unwrap();
    assert_eq!(server.registry.sessions_in_room(conversation).len(), 3);

    alice_ws.send_json(&message_frame("both of you")).await.unwrap();
    for ws in [&mut bob_phone, &mut bob_laptop] {
        let frame = ws.next_json().await.unwrap();
        assert_eq!(frame["message"]["body"], "both of you");
    }
    assert!(server.wait_for_unread(&bob, 0).await);

    // Closing one device leaves the other subscribed
    bob_laptop.close().await.unwrap();
    assert!(server.wait_for_room_size(conversation, 2).await);

    alice_ws.send_json(&message_frame("phone only")).await.unwrap();
    let frame = bob_phone.next_json().await.unwrap();
    assert_eq!(frame["message"]["body"], "phone only");
}
