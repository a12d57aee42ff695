//! # Fourier Repository
//!
//! Data access over SQLite:
//!
//! ```text
//! Service
//!   ↓  SessionManager::acquire_*_session()  → DbSession (one transaction)
//!   ↓  &mut DbSession
//! UserDao / RoleDao             (Dao capability contract)
//!   ↓  QueryBuilder, bound parameters
//! SQLite
//! ```

pub mod dao;
pub mod pool;
pub mod session;

pub use dao::{Dao, Field, FieldSet, RoleDao, SqlValue, UserDao};
pub use pool::*;
pub use session::*;
