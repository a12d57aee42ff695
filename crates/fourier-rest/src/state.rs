//! Application state for Axum handlers.

use fourier_repository::DatabasePool;
use fourier_service::AuthService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    /// Used by the readiness probe.
    pub pool: DatabasePool,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(auth_service: Arc<dyn AuthService>, pool: DatabasePool) -> Self {
        Self { auth_service, pool }
    }
}
