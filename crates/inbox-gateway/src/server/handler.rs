//! WebSocket handler
//!
//! Drives one room connection through its lifecycle: authenticate, authorize,
//! join, serve, leave.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{header, HeaderMap},
    response::IntoResponse,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, StreamExt};
use inbox_core::{Conversation, Snowflake};
use inbox_service::{ConversationService, MessageService, ReadStateService};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};

use crate::connection::{ConnectionState, Session};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{ClientFrame, CloseCode, OutboundFrame};
use crate::server::GatewayState;

/// Longest a single socket write may stall before the peer is dropped
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// `GET /ws/conversations/:conversation_id?token=...`
///
/// The upgrade is always accepted; a rejected connection is closed right
/// away with a close code the client can act on.
pub async fn conversation_socket(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let token = params.token.or_else(|| bearer_token(&headers));
    let conversation_id = Snowflake::parse(&conversation_id).ok();
    ws.on_upgrade(move |socket| handle_socket(state, socket, conversation_id, token))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(
    state: GatewayState,
    mut socket: WebSocket,
    conversation_id: Option<Snowflake>,
    token: Option<String>,
) {
    let mut lifecycle = ConnectionState::Connecting;

    let (participant, conversation) =
        match admit(&state, &mut lifecycle, conversation_id, token.as_deref()).await {
            Ok(admitted) => admitted,
            Err(err) => {
                let code = err.close_code().unwrap_or(CloseCode::UnknownError);
                tracing::info!(
                    conversation_id = ?conversation_id,
                    close_code = code.as_u16(),
                    error = %err,
                    "Connection rejected"
                );
                lifecycle.advance(ConnectionState::Closed);
                let _ = socket.send(close_message(code)).await;
                return;
            }
        };

    let (session, rx) = Session::new(participant, conversation.id, state.config().outbound_buffer);
    state.registry().join(Arc::clone(&session));
    lifecycle.advance(ConnectionState::Active);

    tracing::info!(
        session_id = %session.id(),
        conversation_id = %conversation.id,
        participant = %participant,
        "WebSocket connection established"
    );

    // Catch up on everything that arrived while disconnected
    if let Err(e) = ReadStateService::new(state.service_context())
        .mark_all_read_authorized(&conversation, participant)
        .await
    {
        tracing::warn!(session_id = %session.id(), error = %e, "Failed to mark conversation read");
    }

    let (ws_sink, ws_stream) = socket.split();

    let send_task = tokio::spawn(send_loop(state.clone(), Arc::clone(&session), rx, ws_sink));
    let recv_task = tokio::spawn(recv_loop(state.clone(), Arc::clone(&session), ws_stream));

    // The send loop ends once the session is closed (by either loop, the
    // broadcaster or the sweeper) and the close frame went out
    if let Err(e) = send_task.await {
        tracing::warn!(session_id = %session.id(), error = %e, "Send task failed");
    }
    // A failed socket write ends the loop without a close request
    session.close(CloseCode::Normal);
    let code = session.close_code().unwrap_or(CloseCode::Normal);
    recv_task.abort();

    state.registry().leave(session.room(), session.id());
    lifecycle.advance(ConnectionState::Closed);

    tracing::info!(
        session_id = %session.id(),
        close_code = code.as_u16(),
        "WebSocket connection closed"
    );
}

/// Authenticate the token and authorize the participant for the room
async fn admit(
    state: &GatewayState,
    lifecycle: &mut ConnectionState,
    conversation_id: Option<Snowflake>,
    token: Option<&str>,
) -> GatewayResult<(Snowflake, Conversation)> {
    let ctx = state.service_context();

    let token = token.ok_or_else(|| GatewayError::Unauthenticated("missing token".into()))?;
    let user_id = ctx
        .identity()
        .identify(token)
        .map_err(|e| GatewayError::Unauthenticated(e.to_string()))?;
    match ctx.user_repo().find_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(GatewayError::Unauthenticated("unknown user".into())),
        Err(e) => return Err(GatewayError::Internal(e.to_string())),
    }
    lifecycle.advance(ConnectionState::Authenticated);

    let conversation_id = conversation_id.ok_or(GatewayError::Forbidden)?;
    let conversation = ConversationService::new(ctx)
        .authorize(conversation_id, user_id)
        .await
        .map_err(GatewayError::from_join)?;
    lifecycle.advance(ConnectionState::Authorized);

    Ok((user_id, conversation))
}

/// Drain the outbound queue onto the socket and keep the connection alive
async fn send_loop(
    state: GatewayState,
    session: Arc<Session>,
    mut rx: mpsc::Receiver<OutboundFrame>,
    mut ws_sink: SplitSink<WebSocket, Message>,
) {
    let period = state.config().ping_interval;
    let mut ping = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            biased;

            code = session.closed() => {
                let _ = write_frame(&mut ws_sink, close_message(code), WRITE_TIMEOUT).await;
                break;
            }
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                let json = match frame.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(session_id = %session.id(), error = %e, "Failed to encode frame");
                        continue;
                    }
                };
                match write_frame(&mut ws_sink, Message::Text(json), WRITE_TIMEOUT).await {
                    WriteOutcome::Written => {}
                    WriteOutcome::Failed => {
                        tracing::warn!(session_id = %session.id(), "Failed to send message to WebSocket");
                        break;
                    }
                    WriteOutcome::Stalled => {
                        tracing::warn!(session_id = %session.id(), "Socket write stalled, evicting session");
                        session.close(CloseCode::SlowConsumer);
                        break;
                    }
                }
                if let OutboundFrame::Message(message) = &frame {
                    acknowledge_delivery(&state, &session, message.id, message.sender_id).await;
                }
            }
            _ = ping.tick() => {
                match write_frame(&mut ws_sink, Message::Ping(Vec::new()), WRITE_TIMEOUT).await {
                    WriteOutcome::Written => {}
                    WriteOutcome::Failed => break,
                    WriteOutcome::Stalled => {
                        session.close(CloseCode::SlowConsumer);
                        break;
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Written,
    Failed,
    Stalled,
}

/// Write one frame, giving up when the peer stops draining the socket
async fn write_frame<S>(sink: &mut S, message: Message, limit: Duration) -> WriteOutcome
where
    S: Sink<Message> + Unpin,
{
    match tokio::time::timeout(limit, sink.send(message)).await {
        Ok(Ok(())) => WriteOutcome::Written,
        Ok(Err(_)) => WriteOutcome::Failed,
        Err(_) => WriteOutcome::Stalled,
    }
}

/// A message written to the recipient's socket counts as read
async fn acknowledge_delivery(
    state: &GatewayState,
    session: &Session,
    message_id: Snowflake,
    sender_id: Snowflake,
) {
    if sender_id == session.participant() {
        return;
    }
    if let Err(e) = ReadStateService::new(state.service_context())
        .mark_one_read(message_id, session.participant())
        .await
    {
        tracing::warn!(
            session_id = %session.id(),
            message_id = %message_id,
            error = %e,
            "Failed to mark delivered message read"
        );
    }
}

/// Read client frames until the client leaves, errors, or goes idle
async fn recv_loop(state: GatewayState, session: Arc<Session>, mut ws_stream: SplitStream<WebSocket>) {
    let idle_timeout = state.config().idle_timeout;

    let code = loop {
        let next = match tokio::time::timeout(idle_timeout, ws_stream.next()).await {
            Ok(next) => next,
            Err(_) => {
                tracing::info!(session_id = %session.id(), "Connection idle, closing");
                break CloseCode::SessionTimeout;
            }
        };

        match next {
            Some(Ok(Message::Text(text))) => {
                // Run each send on its own task so a dropped connection cannot
                // cancel a message halfway through being stored and published
                let handler = tokio::spawn(handle_text_frame(
                    state.clone(),
                    Arc::clone(&session),
                    text.to_string(),
                ));
                if let Err(e) = handler.await {
                    tracing::error!(session_id = %session.id(), error = %e, "Frame handler panicked");
                }
            }
            Some(Ok(Message::Binary(_))) => {
                report(&session, &GatewayError::MalformedPayload).await;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                tracing::trace!(session_id = %session.id(), "Ping/pong received");
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!(session_id = %session.id(), "Client closed connection");
                break CloseCode::Normal;
            }
            Some(Err(e)) => {
                tracing::warn!(session_id = %session.id(), error = %e, "WebSocket error");
                break CloseCode::UnknownError;
            }
        }
    };

    session.close(code);
}

async fn handle_text_frame(state: GatewayState, session: Arc<Session>, text: String) {
    if let Err(err) = process_text_frame(&state, &session, &text).await {
        report(&session, &err).await;
    }
}

async fn process_text_frame(state: &GatewayState, session: &Session, text: &str) -> GatewayResult<()> {
    let frame = ClientFrame::parse(text).map_err(|_| GatewayError::MalformedPayload)?;

    MessageService::new(state.service_context())
        .send_message(session.room(), session.participant(), &frame.message)
        .await
        .map_err(GatewayError::from_send)?;
    Ok(())
}

/// Send an error frame to this session only; the connection stays open
async fn report(session: &Session, err: &GatewayError) {
    match err {
        GatewayError::SendFailed(source) => {
            tracing::error!(session_id = %session.id(), error = %source, "Failed to send message");
        }
        _ => tracing::debug!(session_id = %session.id(), error = %err, "Rejected client frame"),
    }
    let _ = session.enqueue(OutboundFrame::error(err.client_message())).await;
}

fn close_message(code: CloseCode) -> Message {
    Message::Close(Some(CloseFrame {
        code: code.as_u16(),
        reason: code.description().into(),
    }))
}
