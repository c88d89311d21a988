//! Inbox server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p inbox-api --bin inbox-server
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use inbox_common::{try_init_tracing_with_config, AppConfig, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(Environment::from_env())) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting inbox server...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        address = %config.server.address(),
        storage = ?config.storage,
        "Configuration loaded"
    );

    inbox_api::run(config).await?;

    info!("Server stopped");
    Ok(())
}
