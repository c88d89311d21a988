//! Test helpers for integration tests
//!
//! Provides the spawned test server, HTTP request helpers and a small
//! WebSocket client.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use inbox_api::{assemble, serve, Storage};
use inbox_common::{AppConfig, JwtService};
use inbox_core::{Snowflake, SnowflakeGenerator, User, UserRepository};
use inbox_db::MemoryStore;
use inbox_gateway::SessionRegistry;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::test_config;

/// How long a test waits for a frame or an eventual condition
pub const WAIT: Duration = Duration::from_secs(5);

static USER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A user seeded into the directory, with a valid access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Snowflake,
    pub name: String,
    pub token: String,
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub registry: Arc<SessionRegistry>,
    jwt: JwtService,
    ids: SnowflakeGenerator,
    _shutdown: oneshot::Sender<()>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);

        let parts = assemble(config, Storage::Memory(Arc::clone(&store)))?;
        let registry = Arc::clone(&parts.registry);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = serve(listener, parts, shutdown).await {
                eprintln!("test server stopped: {e}");
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            store,
            registry,
            jwt,
            ids: SnowflakeGenerator::new(900),
            _shutdown: shutdown_tx,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Seed a user with notifications enabled
    pub async fn create_user(&self, name: &str) -> Result<TestUser> {
        let n = USER_COUNTER.fetch_add(1, Ordering::Relaxed);
        let user = User::new(self.ids.generate(), name, format!("{}{n}@example.com", name.to_lowercase()));
        self.store.create(&user).await?;
        Ok(TestUser {
            id: user.id,
            name: name.to_string(),
            token: self.token_for(user.id)?,
        })
    }

    /// Valid token for any id, known to the directory or not
    pub fn token_for(&self, user_id: Snowflake) -> Result<String> {
        Ok(self.jwt.issue_access_token(user_id)?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).bearer_auth(token).send().await?)
    }

    /// Make a POST request with auth token and JSON body
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request with auth token and no body
    pub async fn post_auth_empty(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).bearer_auth(token).send().await?)
    }

    /// Open (or fetch) the conversation between `user` and `other`
    pub async fn open_conversation(&self, user: &TestUser, other: &TestUser) -> Result<Snowflake> {
        let response = self
            .post_auth(
                "/api/v1/conversations",
                &user.token,
                &serde_json::json!({ "user_id": other.id }),
            )
            .await?;
        let status = response.status();
        if status != StatusCode::CREATED && status != StatusCode::OK {
            bail!("open conversation failed with {status}: {}", response.text().await?);
        }
        let body: Value = response.json().await?;
        parse_id(&body["conversation"]["id"])
    }

    /// Send a message over REST
    pub async fn send_rest(&self, sender: &TestUser, conversation: Snowflake, body: &str) -> Result<Value> {
        let response = self
            .post_auth(
                &format!("/api/v1/conversations/{conversation}/messages"),
                &sender.token,
                &crate::fixtures::SendMessage::new(body),
            )
            .await?;
        assert_json(response, StatusCode::CREATED).await
    }

    /// Global unread count for `user`
    pub async fn unread_count(&self, user: &TestUser) -> Result<i64> {
        let response = self.get_auth("/api/v1/unread-count", &user.token).await?;
        let body: Value = assert_json(response, StatusCode::OK).await?;
        body["unread_count"].as_i64().context("unread_count missing")
    }

    /// Wait until `user` has exactly `expected` unread messages
    pub async fn wait_for_unread(&self, user: &TestUser, expected: i64) -> bool {
        eventually(|| async move { matches!(self.unread_count(user).await, Ok(n) if n == expected) })
            .await
    }

    /// Wait until `room` holds exactly `expected` sessions
    pub async fn wait_for_room_size(&self, room: Snowflake, expected: usize) -> bool {
        eventually(|| async move { self.registry.sessions_in_room(room).len() == expected }).await
    }

    /// WebSocket URL for a conversation room
    pub fn ws_url(&self, conversation: &str, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/ws/conversations/{conversation}?token={token}", self.addr),
            None => format!("ws://{}/ws/conversations/{conversation}", self.addr),
        }
    }

    /// Connect to a room and wait until the session has joined it
    pub async fn connect(&self, user: &TestUser, conversation: Snowflake) -> Result<WsClient> {
        let before = self.registry.sessions_in_room(conversation).len();
        let client = WsClient::connect(&self.ws_url(&conversation.to_string(), Some(&user.token))).await?;
        if !self.wait_for_room_size(conversation, before + 1).await {
            bail!("session never joined room {conversation}");
        }
        Ok(client)
    }
}

/// Minimal gateway client
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_json(&mut self, value: &Value) -> Result<()> {
        self.send_text(&value.to_string()).await
    }

    /// Next text frame as JSON, skipping control frames
    pub async fn next_json(&mut self) -> Result<Value> {
        loop {
            let next = tokio::time::timeout(WAIT, self.stream.next())
                .await
                .context("timed out waiting for a frame")?;
            match next {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(frame))) => bail!("connection closed: {frame:?}"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => bail!("stream ended"),
            }
        }
    }

    /// Wait for the server to close the connection and return the close code
    pub async fn expect_close(&mut self) -> Result<u16> {
        loop {
            let next = tokio::time::timeout(WAIT, self.stream.next())
                .await
                .context("timed out waiting for close")?;
            match next {
                Some(Ok(Message::Close(Some(frame)))) => return Ok(u16::from(frame.code)),
                Some(Ok(Message::Close(None))) => bail!("closed without a code"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => bail!("stream ended without a close frame"),
            }
        }
    }

    /// Assert nothing but control frames arrives for `quiet`
    pub async fn expect_silence(&mut self, quiet: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + quiet;
        loop {
            match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Err(_) => return Ok(()),
                Ok(Some(Ok(Message::Text(text)))) => bail!("unexpected frame: {text}"),
                Ok(Some(Ok(Message::Close(frame)))) => bail!("unexpected close: {frame:?}"),
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => bail!("stream ended"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Poll `check` until it holds or [`WAIT`] elapses
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Snowflake ids travel as JSON strings
pub fn parse_id(value: &Value) -> Result<Snowflake> {
    let raw = value.as_str().context("id is not a string")?;
    Ok(Snowflake::parse(raw)?)
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status and return the `error.code` of the body
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(String::from)
        .context("error.code missing")
}
