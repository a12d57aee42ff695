//! Password hashing using Argon2.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2, Params,
};
use fourier_core::{FourierError, FourierResult};
use std::sync::Arc;
use tracing::debug;

/// Password hasher service using Argon2id.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    #[must_use]
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
        Self {
            argon2: Arc::new(argon2),
        }
    }

    /// Creates a hasher with `time_cost` iterations and default memory.
    #[must_use]
    pub fn with_cost(time_cost: u32) -> Self {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            time_cost.max(1),
            Params::DEFAULT_P_COST,
            None,
        )
        .unwrap_or(Params::DEFAULT);

        Self::with_params(params)
    }

    /// Hashes a password into a PHC string.
    pub fn hash(&self, password: &str) -> FourierResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| FourierError::Internal(format!("Failed to hash password: {e}")))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> FourierResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| FourierError::Internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(FourierError::Internal(format!(
                "Password verification error: {e}"
            ))),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::with_cost(1);
        let hash = hasher.hash("abcde").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("abcde", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let hasher = PasswordHasher::with_cost(1);
        let hash1 = hasher.hash("abcde").unwrap();
        let hash2 = hasher.hash("abcde").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("abcde", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format_returns_error() {
        let hasher = PasswordHasher::default();
        assert!(hasher.verify("password", "not-a-valid-hash").is_err());
    }

    #[test]
    fn test_hash_from_other_cost_still_verifies() {
        let hash = PasswordHasher::with_cost(3).hash("abcde").unwrap();
        assert!(PasswordHasher::with_cost(1).verify("abcde", &hash).unwrap());
    }

    #[test]
    fn test_hasher_debug_does_not_leak_internals() {
        let debug_str = format!("{:?}", PasswordHasher::new());
        assert_eq!(debug_str, "PasswordHasher { .. }");
    }
}
