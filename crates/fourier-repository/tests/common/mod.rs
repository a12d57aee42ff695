//! Common test infrastructure for database integration tests.

use fourier_core::NewUser;
use fourier_repository::{connect_in_memory, DbSession, SessionManager};

/// In-memory SQLite database with migrations applied.
///
/// The pool holds a single connection, so every test gets its own database
/// and at most one session may be open at a time.
pub struct TestDatabase {
    sessions: SessionManager,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let pool = connect_in_memory()
            .await
            .expect("Failed to open in-memory database");
        Self {
            sessions: SessionManager::new(pool),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Opens a session whose work is committed by `finish`.
    pub async fn session(&self) -> DbSession {
        self.sessions
            .acquire_transactional_session()
            .await
            .expect("Failed to open session")
    }
}

pub fn new_user(email: &str) -> NewUser {
    NewUser::new(email, "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA")
}
