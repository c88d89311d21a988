//! Gateway state
//!
//! Shared dependencies for room connections.

use std::sync::Arc;

use inbox_common::GatewayConfig;
use inbox_service::ServiceContext;

use crate::connection::SessionRegistry;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and services
    service_context: Arc<ServiceContext>,
    /// Live sessions by room
    registry: Arc<SessionRegistry>,
    /// Queue sizes and liveness timings
    config: Arc<GatewayConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        registry: Arc<SessionRegistry>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            service_context,
            registry,
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
