//! Test fixtures and request bodies

use std::time::Duration;

use inbox_common::{
    AppConfig, AppSettings, CorsConfig, GatewayConfig, JwtConfig, NotificationConfig,
    RateLimitConfig, ServerConfig, SnowflakeConfig, StorageMode,
};
use inbox_core::Snowflake;
use serde::Serialize;
use serde_json::{json, Value};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// In-memory configuration with a rate limit no test will hit
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings::default(),
        server: ServerConfig::default(),
        storage: StorageMode::Memory,
        database: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry: 3600,
        },
        gateway: GatewayConfig {
            sweep_interval: Duration::from_secs(1),
            ..GatewayConfig::default()
        },
        notifications: NotificationConfig::default(),
        rate_limit: RateLimitConfig {
            requests_per_second: 10_000,
            burst: 10_000,
        },
        cors: CorsConfig::default(),
        snowflake: SnowflakeConfig { worker_id: 1 },
    }
}

#[derive(Debug, Serialize)]
pub struct CreateConversation {
    pub user_id: Snowflake,
}

#[derive(Debug, Serialize)]
pub struct SendMessage {
    pub body: String,
}

impl SendMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// Inbound gateway frame
pub fn message_frame(text: &str) -> Value {
    json!({ "message": text })
}
