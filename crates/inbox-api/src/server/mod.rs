//! Server setup and initialization
//!
//! Wires storage, the live gateway and the service layer together and runs
//! the HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use inbox_common::{AppConfig, AppError, JwtService, StorageMode};
use inbox_core::{NotificationDispatcher, SnowflakeGenerator};
use inbox_db::{
    create_pool, run_migrations, MemoryStore, PgConversationRepository, PgMessageRepository,
    PgPool, PgUserRepository,
};
use inbox_gateway::{gateway_routes, spawn_sweeper, Broadcaster, GatewayState, SessionRegistry};
use inbox_service::{LogNotifier, ServiceContext, ServiceContextBuilder, ServiceSettings, WebhookNotifier};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Backing store for users, conversations and messages
pub enum Storage {
    Postgres(PgPool),
    Memory(Arc<MemoryStore>),
}

/// Everything the HTTP app and the background sweeper share
#[derive(Debug, Clone)]
pub struct AppParts {
    pub state: AppState,
    pub gateway: GatewayState,
    pub registry: Arc<SessionRegistry>,
    pub service_context: Arc<ServiceContext>,
}

/// Build the complete Axum application with all routes and middleware
pub fn create_app(parts: &AppParts) -> Router {
    let config = parts.state.config();

    let api = create_router()
        .with_state(parts.state.clone())
        .merge(gateway_routes().with_state(parts.gateway.clone()));
    let api = apply_middleware_with_config(
        api,
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    health_routes().with_state(parts.state.clone()).merge(api)
}

/// Open the configured storage
pub async fn open_storage(config: &AppConfig) -> Result<Storage, AppError> {
    match (config.storage, &config.database) {
        (StorageMode::Memory, _) => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Storage::Memory(Arc::new(MemoryStore::new())))
        }
        (StorageMode::Postgres, Some(db_config)) => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(db_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            run_migrations(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");
            Ok(Storage::Postgres(pool))
        }
        (StorageMode::Postgres, None) => {
            Err(AppError::Config("DATABASE_URL is required for Postgres storage".into()))
        }
    }
}

/// Initialize all dependencies on top of `storage`
pub fn assemble(config: AppConfig, storage: Storage) -> Result<AppParts, AppError> {
    let identity = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let registry = SessionRegistry::new_shared();
    let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));

    let notifier: Arc<dyn NotificationDispatcher> = match &config.notifications.webhook_url {
        Some(url) => {
            info!(url = %url, "Delivering notifications to webhook");
            Arc::new(
                WebhookNotifier::new(url.clone(), config.notifications.webhook_timeout)
                    .map_err(|e| AppError::Config(e.to_string()))?,
            )
        }
        None => Arc::new(LogNotifier),
    };

    let builder = ServiceContextBuilder::new()
        .identity(identity)
        .publisher(broadcaster)
        .notifier(notifier)
        .snowflake_generator(snowflake_generator)
        .settings(ServiceSettings::from(&config.notifications));

    let builder = match storage {
        Storage::Postgres(pool) => builder
            .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
            .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
            .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
            .pool(pool),
        Storage::Memory(store) => builder.repositories(store),
    };

    let service_context = Arc::new(builder.build().map_err(|e| AppError::Config(e.to_string()))?);

    let gateway = GatewayState::new(
        Arc::clone(&service_context),
        Arc::clone(&registry),
        config.gateway.clone(),
    );
    let state = AppState::new(Arc::clone(&service_context), Arc::new(config));

    Ok(AppParts {
        state,
        gateway,
        registry,
        service_context,
    })
}

/// Open storage and initialize all dependencies
pub async fn build_state(config: AppConfig) -> Result<AppParts, AppError> {
    let storage = open_storage(&config).await?;
    assemble(config, storage)
}

/// Serve `parts` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, parts: AppParts, shutdown: F) -> Result<(), AppError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let sweeper = spawn_sweeper(
        Arc::clone(&parts.registry),
        Arc::clone(&parts.service_context),
        parts.state.config().gateway.sweep_interval,
    );

    let app = create_app(&parts);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")));

    sweeper.abort();
    result
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    let parts = build_state(config).await?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;
    info!("Server listening on http://{}", addr);

    serve(listener, parts, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
