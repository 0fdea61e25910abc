use axum::extract::FromRef;
use std::sync::Arc;

use super::ServerConfig;
use crate::predict::ModelRegistry;

/// Built once at startup, read-only afterwards
pub type SharedRegistry = Arc<ModelRegistry>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub registry: SharedRegistry,
}

impl ServerState {
    pub fn new(config: ServerConfig, registry: ModelRegistry) -> ServerState {
        ServerState {
            config,
            registry: Arc::new(registry),
        }
    }
}

impl FromRef<ServerState> for SharedRegistry {
    fn from_ref(input: &ServerState) -> Self {
        input.registry.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
