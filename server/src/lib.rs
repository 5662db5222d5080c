//! FILENAME: server/src/lib.rs
// PURPOSE: Main library entry point (HTTP service wiring).
// CONTEXT: Composes the scenario schema and the engine bridge into the
// /api/calc route. Kept as a library so the integration tests can build the
// same state with a test-double engine connector.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::Router;

use engine_bridge::{EnginePool, HostConnector, OutputRegion};

pub mod config;
pub mod csv;
pub mod handler;
pub mod logging;

pub use config::{ConfigError, ServerConfig};
pub use handler::{ApiError, ErrorBody};

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Shared per-process state: the engine instance pool and the output region
/// contract. One `AppState` serves all requests.
pub struct AppState {
    pub pool: EnginePool,
    pub output_region: OutputRegion,
}

/// Builds the production state from configuration: a pool of host-process
/// engine instances.
pub fn create_app_state(config: &ServerConfig) -> AppState {
    let connector = HostConnector::new(config.engine.clone());
    AppState {
        pool: EnginePool::new(
            Box::new(connector),
            config.pool_size,
            Duration::from_millis(config.acquire_timeout_ms),
        ),
        output_region: config.output_region(),
    }
}

/// The service router. Exactly one operation.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/calc", post(handler::calc))
        .with_state(state)
}
