//! JWT token provider for creating and validating access tokens.

use super::Claims;
use chrono::{Duration, Utc};
use fourier_config::SecurityConfig;
use fourier_core::{FourierError, FourierResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::str::FromStr;
use tracing::{debug, warn};

/// Lifetime of every issued access token.
pub const ACCESS_TOKEN_LIFETIME_DAYS: i64 = 30;

/// Signs and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a token provider from the security settings.
    ///
    /// Fails with a configuration error when the algorithm is not one of
    /// the HMAC variants.
    pub fn new(config: &SecurityConfig) -> FourierResult<Self> {
        let algorithm = Algorithm::from_str(&config.jwt_algorithm).map_err(|_| {
            FourierError::Configuration(format!(
                "Unsupported JWT algorithm: {}",
                config.jwt_algorithm
            ))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(FourierError::Configuration(format!(
                "JWT algorithm {:?} needs a key pair; only HMAC algorithms are supported",
                algorithm
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm,
            validation,
        })
    }

    /// Issues a token for `user_id` valid for [`ACCESS_TOKEN_LIFETIME_DAYS`].
    pub fn create_access_token(&self, user_id: i64) -> FourierResult<String> {
        self.issue_with_expiry(user_id, Duration::days(ACCESS_TOKEN_LIFETIME_DAYS))
    }

    /// Issues a token for `user_id` that expires `lifetime` from now.
    pub fn issue_with_expiry(&self, user_id: i64, lifetime: Duration) -> FourierResult<String> {
        let claims = Claims::for_user(user_id, Utc::now() + lifetime);
        let token = self.encode(&claims)?;
        debug!("Generated access token for user {}", user_id);
        Ok(token)
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> FourierResult<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| FourierError::Internal(format!("Failed to generate access token: {e}")))
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    pub fn decode(&self, token: &str) -> FourierResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                warn!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => FourierError::TokenExpired,
                    _ => FourierError::InvalidToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Decodes `token` and parses its subject into a user id.
    pub fn subject_user_id(&self, token: &str) -> FourierResult<i64> {
        let claims = self.decode(token)?;
        let sub = claims.sub.ok_or(FourierError::NoUserId)?;
        sub.parse::<i64>().map_err(|_| {
            warn!("Token subject is not a user id: {}", sub);
            FourierError::InvalidToken
        })
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
