//! Gateway server setup
//!
//! Room routes and the background sweeper.

mod handler;
mod state;

pub use handler::{conversation_socket, ConnectParams};
pub use state::GatewayState;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use inbox_service::ServiceContext;
use tokio::task::JoinHandle;

use crate::connection::SessionRegistry;

/// Create the gateway router
pub fn gateway_routes() -> Router<GatewayState> {
    Router::new().route("/ws/conversations/:conversation_id", get(conversation_socket))
}

/// Periodically drop closed sessions from the registry and idle per-room
/// send locks
pub fn spawn_sweeper(
    registry: Arc<SessionRegistry>,
    service_context: Arc<ServiceContext>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(10)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let sessions = registry.prune_closed();
            let locks = service_context.sequencer().prune();
            if sessions > 0 || locks > 0 {
                tracing::debug!(sessions, locks, "Swept closed sessions");
            }
        }
    })
}
