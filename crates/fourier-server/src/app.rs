//! Application assembly.

use axum::Router;
use fourier_config::AppConfig;
use fourier_core::FourierResult;
use fourier_repository::{create_pool, DatabasePool, SessionManager};
use fourier_rest::{create_router, AppState};
use fourier_security::{PasswordHasher, TokenProvider};
use fourier_service::AuthServiceImpl;
use std::sync::Arc;
use tracing::info;

/// A ready-to-serve application and the pool it runs on.
pub struct App {
    pub router: Router,
    pub pool: DatabasePool,
}

/// Opens the database, applies migrations and wires the services into a
/// router.
pub async fn build_app(config: &AppConfig) -> FourierResult<App> {
    let pool = create_pool(&config.database).await?;
    pool.run_migrations().await?;

    let token_provider = Arc::new(TokenProvider::new(&config.security)?);
    let password_hasher = Arc::new(PasswordHasher::with_cost(
        config.security.password_hash_cost,
    ));
    info!("Signing access tokens with {}", config.security.jwt_algorithm);

    let sessions = SessionManager::new(pool.clone());
    let auth_service = AuthServiceImpl::new(sessions, password_hasher, token_provider);

    let state = AppState::new(Arc::new(auth_service), pool.clone());
    let router = create_router(state, &config.server);

    Ok(App { router, pool })
}
