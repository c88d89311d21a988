//! Application configuration
//!
//! Loaded from environment variables (a `.env` file is honored). Every
//! section has defaults except the JWT secret and, for Postgres storage,
//! the database URL.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub storage: StorageMode,
    /// Present when `storage` is [`StorageMode::Postgres`]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub gateway: GatewayConfig,
    pub notifications: NotificationConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "inbox".to_string(),
            env: Environment::Development,
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Read `APP_ENV`, defaulting to development for unknown values
    #[must_use]
    pub fn from_env() -> Self {
        var("APP_ENV")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// HTTP listener (REST and WebSocket share one port)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Where conversations and messages are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Postgres,
    /// Process-local storage, lost on restart
    Memory,
}

impl FromStr for StorageMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
}

/// Live connection settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Frames buffered per session before it is considered too slow and evicted
    pub outbound_buffer: usize,
    pub ping_interval: Duration,
    /// Close a session when nothing was received for this long
    pub idle_timeout: Duration,
    /// How often closed sessions are swept from the registry
    pub sweep_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: 256,
            ping_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// New-message notification settings
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// POST notifications here; log only when unset
    pub webhook_url: Option<String>,
    /// A conversation silent for at least this long counts as renewed
    pub dormant_after: chrono::Duration,
    pub webhook_timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            dormant_after: chrono::Duration::hours(48),
            webhook_timeout: Duration::from_secs(5),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst: 50,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Default)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = match var("INBOX_STORAGE") {
            Some(raw) => raw
                .parse()
                .map_err(|()| ConfigError::InvalidValue("INBOX_STORAGE", raw))?,
            None => StorageMode::default(),
        };

        let database = match (storage, var("DATABASE_URL")) {
            (StorageMode::Memory, _) => None,
            (StorageMode::Postgres, None) => return Err(ConfigError::MissingVar("DATABASE_URL")),
            (StorageMode::Postgres, Some(url)) => {
                let defaults = DatabaseConfig::new(url);
                Some(DatabaseConfig {
                    max_connections: parse_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
                    min_connections: parse_or("DATABASE_MIN_CONNECTIONS", defaults.min_connections)?,
                    acquire_timeout: secs_or("DATABASE_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout)?,
                    idle_timeout: secs_or("DATABASE_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
                    ..defaults
                })
            }
        };

        let server_defaults = ServerConfig::default();
        let gateway_defaults = GatewayConfig::default();
        let notification_defaults = NotificationConfig::default();
        let rate_defaults = RateLimitConfig::default();

        let outbound_buffer = parse_or("GATEWAY_OUTBOUND_BUFFER", gateway_defaults.outbound_buffer)?;
        if outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue("GATEWAY_OUTBOUND_BUFFER", "0".to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(|| AppSettings::default().name),
                env: Environment::from_env(),
            },
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or(server_defaults.host),
                port: parse_or("SERVER_PORT", server_defaults.port)?,
            },
            storage,
            database,
            jwt: JwtConfig {
                secret: var("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: parse_or("JWT_ACCESS_TOKEN_EXPIRY", 900)?,
            },
            gateway: GatewayConfig {
                outbound_buffer,
                ping_interval: secs_or("GATEWAY_PING_INTERVAL_SECS", gateway_defaults.ping_interval)?,
                idle_timeout: secs_or("GATEWAY_IDLE_TIMEOUT_SECS", gateway_defaults.idle_timeout)?,
                sweep_interval: secs_or("GATEWAY_SWEEP_INTERVAL_SECS", gateway_defaults.sweep_interval)?,
            },
            notifications: NotificationConfig {
                webhook_url: var("NOTIFICATION_WEBHOOK_URL"),
                dormant_after: chrono::Duration::hours(parse_or(
                    "NOTIFICATION_DORMANT_HOURS",
                    notification_defaults.dormant_after.num_hours(),
                )?),
                webhook_timeout: secs_or(
                    "NOTIFICATION_WEBHOOK_TIMEOUT_SECS",
                    notification_defaults.webhook_timeout,
                )?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_or(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    rate_defaults.requests_per_second,
                )?,
                burst: parse_or("RATE_LIMIT_BURST", rate_defaults.burst)?,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_or("WORKER_ID", 0)?,
            },
        })
    }
}

/// Non-empty environment variable
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
    }
}

fn secs_or(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    parse_or(key, default.as_secs()).map(Duration::from_secs)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
