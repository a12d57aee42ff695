//! # Fourier Security
//!
//! Access token issuing and decoding, Argon2 password hashing, and the
//! admin role guard.

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::*;
pub use password::*;
pub use rbac::*;
